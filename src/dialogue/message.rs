//! Messages exchanged between the user and the dialogue engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a bot message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Greeting or next question.
    Question,
    /// The utterance matched no template.
    Clarification,
    /// The answer was too short and the step is asked again.
    Rejection,
    /// The generated artifact.
    Final,
    Error,
    Notice,
}

/// One message from the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMessage {
    pub id: Uuid,
    pub kind: MessageKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl BotMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn question(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Question, text)
    }

    pub fn is_final(&self) -> bool {
        self.kind == MessageKind::Final
    }
}

/// One user turn: free text or a tap on an offered suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserInput {
    Text { text: String },
    Suggestion { label: String },
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn suggestion(label: impl Into<String>) -> Self {
        Self::Suggestion {
            label: label.into(),
        }
    }

    /// The raw utterance, whichever way it was entered.
    pub fn utterance(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Suggestion { label } => label,
        }
    }
}
