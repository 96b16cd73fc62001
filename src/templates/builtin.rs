//! Built-in dialogue flows.

use super::model::{ConversationStep, TemplateDefinition, TemplateType};

/// All built-in flows, in menu order.
pub fn builtin_templates() -> Vec<TemplateDefinition> {
    vec![blog(), email(), naming(), journal()]
}

fn blog() -> TemplateDefinition {
    TemplateDefinition {
        template_type: TemplateType::Blog,
        menu_label: "블로그 글쓰기",
        keywords: &["블로그"],
        steps: vec![
            ConversationStep::ask("어떤 주제에 대해 글을 쓸까요?", "topic")
                .with_min_length(4)
                .with_rejection(
                    "주제를 조금만 더 구체적으로 알려주시겠어요?",
                    "예를 들어 'AI 윤리'처럼 글의 중심이 되는 주제를 적어주세요.",
                ),
            ConversationStep::ask("글을 읽는 독자는 누구인가요?", "targetAudience")
                .with_suggestions(&["대학생", "직장인", "개발자"])
                .with_min_length(2),
            ConversationStep::ask("어떤 톤으로 글을 쓸까요?", "tone")
                .with_suggestions(&["친근하게", "전문적으로", "유머있게"])
                .with_min_length(2),
            ConversationStep::ask(
                "글에 꼭 포함되어야 할 내용이 있나요? (없으면 \"없음\"이라고 입력)",
                "constraints",
            )
            .with_min_length(5)
            .with_rejection(
                "포함할 내용을 조금 더 자세히 적어주세요. 없다면 \"없음\"이라고 입력해주세요.",
                "예를 들어 '사례 두 가지를 넣어줘'처럼 적어주시면 돼요. 없다면 \"없음\"이라고 입력해주세요.",
            ),
            ConversationStep::finish(
                "모든 준비가 끝났어요! 아래 버튼을 눌러 글을 생성해 보세요.",
                "✨ 프롬프트 생성하기",
            ),
        ],
    }
}

fn email() -> TemplateDefinition {
    TemplateDefinition {
        template_type: TemplateType::Email,
        menu_label: "이메일 작성",
        keywords: &["이메일", "메일"],
        steps: vec![
            ConversationStep::ask("누구에게 보내는 이메일인가요?", "recipient")
                .with_suggestions(&["상사", "동료", "고객", "교수님"])
                .with_min_length(2),
            ConversationStep::ask("이메일을 보내는 목적이 무엇인가요?", "purpose")
                .with_min_length(10)
                .with_rejection(
                    "목적을 한 문장으로 조금 더 설명해주시겠어요?",
                    "예를 들어 '다음 주 회의 일정을 변경하고 싶어요'처럼 적어주세요.",
                ),
            ConversationStep::ask("꼭 전달해야 할 핵심 내용을 알려주세요.", "keyPoints")
                .with_min_length(10)
                .with_rejection(
                    "핵심 내용을 조금 더 자세히 알려주세요.",
                    "날짜, 요청 사항, 부탁할 일 같은 구체적인 내용을 적어주시면 좋아요.",
                ),
            ConversationStep::ask("어떤 어조로 쓸까요?", "tone")
                .with_suggestions(&["정중하게", "친근하게", "간결하게"])
                .with_min_length(2),
            ConversationStep::finish(
                "좋아요, 이메일에 필요한 내용이 모두 모였어요! 아래 버튼을 눌러 주세요.",
                "✉️ 이메일 생성하기",
            ),
        ],
    }
}

fn naming() -> TemplateDefinition {
    TemplateDefinition {
        template_type: TemplateType::Naming,
        menu_label: "이름 짓기",
        keywords: &["이름", "네이밍"],
        steps: vec![
            ConversationStep::ask("무엇의 이름을 지어드릴까요?", "subject")
                .with_suggestions(&["카페", "앱 서비스", "반려동물"])
                .with_min_length(2),
            ConversationStep::ask("어떤 특징이나 분위기를 가지고 있나요?", "description")
                .with_min_length(10)
                .with_rejection(
                    "특징을 조금 더 들려주세요.",
                    "예를 들어 '조용한 골목의 따뜻한 동네 카페'처럼 적어주세요.",
                ),
            ConversationStep::ask("어떤 느낌의 이름을 원하세요?", "style")
                .with_suggestions(&["짧고 강렬하게", "우아하게", "재치있게"])
                .with_min_length(2),
            ConversationStep::ask(
                "피하고 싶은 단어나 느낌이 있나요? (없으면 \"없음\"이라고 입력)",
                "avoid",
            )
            .with_min_length(2),
            ConversationStep::finish(
                "이름을 지을 준비가 됐어요! 아래 버튼을 눌러 제안을 받아보세요.",
                "🏷️ 이름 제안받기",
            ),
        ],
    }
}

fn journal() -> TemplateDefinition {
    TemplateDefinition {
        template_type: TemplateType::Journal,
        menu_label: "일기 쓰기",
        keywords: &["일기", "저널"],
        steps: vec![
            ConversationStep::ask("오늘 하루 기분은 어땠나요?", "mood")
                .with_suggestions(&["기뻤어요", "평온했어요", "지쳤어요", "속상했어요"])
                .with_min_length(2),
            ConversationStep::ask("오늘 있었던 일을 들려주세요.", "events")
                .with_min_length(10)
                .with_rejection(
                    "어떤 일이 있었는지 조금 더 들려주시겠어요?",
                    "누구와 어디서 무엇을 했는지 떠오르는 대로 적어주세요.",
                ),
            ConversationStep::ask(
                "오늘을 돌아보며 느낀 점이 있나요? (없으면 \"없음\"이라고 입력)",
                "reflection",
            )
            .with_min_length(5),
            ConversationStep::finish(
                "오늘의 이야기를 잘 들었어요. 아래 버튼을 눌러 일기를 완성해 보세요.",
                "📔 일기 완성하기",
            ),
        ],
    }
}
