//! Meta-instruction rendering for the generation backend.
//!
//! The meta-instruction has three parts: a template-specific brief, the
//! validated inputs as an ordered JSON object, and the authoring rules every
//! artifact must follow.

use serde_json::{Map, Value};

use crate::validation::{BlogInputs, EmailInputs, JournalInputs, NamingInputs, ValidatedInputs};

/// Rules appended to every meta-instruction.
const AUTHORING_RULES: &str = "\
### 작성 규칙(Rules)
- 반드시 한국어로 작성해줘.
- 입력값의 키 이름을 나열하지 말고, 값들을 자연스러운 문장 속에 녹여줘.
- 제목, 목록, 마크다운 같은 구조적 서식은 쓰지 마.
- 같은 내용을 반복하지 말고, 군더더기 없이 작성해줘.
- 결과물 본문만 출력하고, 설명이나 인사말은 덧붙이지 마.";

/// Render the full meta-instruction for validated inputs.
pub fn meta_instruction(inputs: &ValidatedInputs) -> String {
    let (brief, shape) = match inputs {
        ValidatedInputs::Blog(b) => (blog_brief(inputs, b), "600자 내외의 하나의 매끄러운 문단"),
        ValidatedInputs::Email(e) => (email_brief(e), "인사, 본문, 맺음말이 자연스럽게 이어지는 이메일 한 통"),
        ValidatedInputs::Naming(n) => (naming_brief(inputs, n), "이름 후보 다섯 개와 각 이름에 대한 한 문장 설명"),
        ValidatedInputs::Journal(j) => (journal_brief(inputs, j), "1인칭 시점의 하나의 차분한 문단"),
    };

    format!(
        "{brief}\n\n\
         ### 입력값(Inputs)\n\
         템플릿: {template}\n\
         {inputs_json}\n\n\
         {rules}\n\
         - 결과물의 형태: {shape}",
        template = inputs.template_type(),
        inputs_json = inputs_json(inputs),
        rules = AUTHORING_RULES,
    )
}

/// Inputs as a pretty JSON object in schema order.
fn inputs_json(inputs: &ValidatedInputs) -> String {
    let map: Map<String, Value> = inputs
        .fields()
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
}

fn blog_brief(inputs: &ValidatedInputs, b: &BlogInputs) -> String {
    let constraints = match inputs.meaningful(&b.constraints) {
        Some(c) => format!("\n- 그리고 다음 제약사항을 반드시 지켜줘: {c}"),
        None => String::new(),
    };
    format!(
        "### 역할(Role)\n\
         너는 {audience}를 위한 IT 콘텐츠 크리에이터이자, 복잡한 기술을 아주 쉽게 설명해주는 전문가야.\n\n\
         ### 맥락(Context)\n\
         '{topic}'에 대한 블로그 글을 작성하려고 해. 독자들이 이 글을 통해 유용한 정보를 얻고, 자신감을 얻게 하는 것이 목표야.\n\n\
         ### 지시(Instruction)\n\
         위 맥락에 맞춰, 블로그 글의 초안을 작성해줘.\n\n\
         ### 제약(Constraints)\n\
         - 전체 글자 수는 600자 내외로 작성해줘.\n\
         - '{tone}' 톤앤매너를 사용해줘.{constraints}",
        audience = b.target_audience,
        topic = b.topic,
        tone = b.tone,
    )
}

fn email_brief(e: &EmailInputs) -> String {
    format!(
        "### 역할(Role)\n\
         너는 상황에 꼭 맞는 비즈니스 이메일을 쓰는 커뮤니케이션 전문가야.\n\n\
         ### 맥락(Context)\n\
         {recipient}에게 보내는 이메일이야. 목적은 다음과 같아: {purpose}\n\n\
         ### 지시(Instruction)\n\
         아래 핵심 내용을 빠짐없이 전달하는 이메일을 작성해줘: {points}\n\n\
         ### 제약(Constraints)\n\
         - '{tone}' 어조를 유지해줘.\n\
         - 받는 사람이 바로 이해하고 답장할 수 있도록 요청 사항을 분명히 해줘.",
        recipient = e.recipient,
        purpose = e.purpose,
        points = e.key_points,
        tone = e.tone,
    )
}

fn naming_brief(inputs: &ValidatedInputs, n: &NamingInputs) -> String {
    let avoid = match inputs.meaningful(&n.avoid) {
        Some(a) => format!("\n- 다음 단어나 느낌은 피해줘: {a}"),
        None => String::new(),
    };
    format!(
        "### 역할(Role)\n\
         너는 브랜드 네이밍 전문가야.\n\n\
         ### 맥락(Context)\n\
         '{subject}'의 이름을 지으려고 해. 특징은 다음과 같아: {description}\n\n\
         ### 지시(Instruction)\n\
         기억하기 쉽고 특징이 잘 드러나는 이름 후보를 제안해줘.\n\n\
         ### 제약(Constraints)\n\
         - '{style}' 느낌을 살려줘.{avoid}",
        subject = n.subject,
        description = n.description,
        style = n.style,
    )
}

fn journal_brief(inputs: &ValidatedInputs, j: &JournalInputs) -> String {
    let reflection = match inputs.meaningful(&j.reflection) {
        Some(r) => format!("\n- 글의 끝에서 다음 생각을 자연스럽게 되새겨줘: {r}"),
        None => String::new(),
    };
    format!(
        "### 역할(Role)\n\
         너는 하루를 따뜻하게 정리해주는 일기 작가야.\n\n\
         ### 맥락(Context)\n\
         오늘의 기분은 '{mood}'였고, 이런 일이 있었어: {events}\n\n\
         ### 지시(Instruction)\n\
         위 내용을 바탕으로 오늘의 일기를 써줘.\n\n\
         ### 제약(Constraints)\n\
         - 과장하지 말고 솔직한 감정을 담아줘.{reflection}",
        mood = j.mood,
        events = j.events,
    )
}
