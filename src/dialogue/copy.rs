//! Fixed assistant copy used outside any template flow.

use crate::templates::ConversationStep;

pub const GREETING: &str =
    "안녕하세요! 저는 당신의 AI 어시스턴트, 지음입니다. 어떤 결과물을 만들고 싶으신가요?";

pub const CLARIFICATION: &str =
    "죄송해요, 아직 그 작업은 도와드리기 어려워요. 아래에서 만들고 싶은 결과물을 골라주세요.";

pub const GENERATING: &str = "좋아요! 결과물을 만들고 있어요. 잠시만 기다려 주세요.";

pub const ANOTHER_ROUND: &str = "다른 결과물도 만들어 볼까요?";

pub const RESTART_KEYWORDS: &[&str] = &["처음으로", "/restart"];

/// First re-ask for a too-short answer.
pub fn rejection(step: &ConversationStep) -> String {
    match step.rejection {
        Some(text) => text.to_string(),
        None => "조금만 더 자세히 알려주시겠어요?".to_string(),
    }
}

/// Re-ask once the same field was already rejected.
pub fn escalation(step: &ConversationStep) -> String {
    match (step.escalation, step.min_length) {
        (Some(text), _) => text.to_string(),
        (None, Some(min)) => format!("답변이 너무 짧아요. {min}자 이상으로 구체적으로 적어주세요."),
        (None, None) => "답변을 입력해주세요.".to_string(),
    }
}

/// Shown when synthesis is refused or fails.
pub fn failure(detail: &str) -> String {
    format!("죄송해요, 생성 중 문제가 발생했어요. ({detail})")
}
