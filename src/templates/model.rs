//! Template and conversation step data types.

use serde::{Deserialize, Serialize};

/// Stable tag identifying one dialogue flow and the artifact it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Blog,
    Email,
    Naming,
    Journal,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [Self::Blog, Self::Email, Self::Naming, Self::Journal];

    /// Parse a wire tag. Matching is exact.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Email => "email",
            Self::Naming => "naming",
            Self::Journal => "journal",
        }
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pre-canned answer the user may pick instead of typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedReply {
    pub label: String,
    /// Selecting this reply triggers synthesis instead of recording a value.
    #[serde(default)]
    pub triggers_final: bool,
}

impl SuggestedReply {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            triggers_final: false,
        }
    }

    pub fn trigger(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            triggers_final: true,
        }
    }
}

/// One question in a flow.
#[derive(Debug, Clone)]
pub struct ConversationStep {
    pub question: &'static str,
    /// Where the answer is stored. `None` only on the terminal step.
    pub field_key: Option<&'static str>,
    pub suggestions: Vec<SuggestedReply>,
    /// Minimum trimmed character count for freely typed answers.
    pub min_length: Option<usize>,
    /// First re-ask when an answer is too short.
    pub rejection: Option<&'static str>,
    /// Re-ask used when the same field is rejected again.
    pub escalation: Option<&'static str>,
    pub terminal: bool,
}

impl ConversationStep {
    /// A question storing its answer under `field_key`.
    pub fn ask(question: &'static str, field_key: &'static str) -> Self {
        Self {
            question,
            field_key: Some(field_key),
            suggestions: Vec::new(),
            min_length: None,
            rejection: None,
            escalation: None,
            terminal: false,
        }
    }

    /// The closing step whose suggestion triggers synthesis.
    pub fn finish(question: &'static str, trigger_label: &'static str) -> Self {
        Self {
            question,
            field_key: None,
            suggestions: vec![SuggestedReply::trigger(trigger_label)],
            min_length: None,
            rejection: None,
            escalation: None,
            terminal: true,
        }
    }

    pub fn with_suggestions(mut self, labels: &[&str]) -> Self {
        self.suggestions = labels.iter().map(|l| SuggestedReply::new(*l)).collect();
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_rejection(mut self, first: &'static str, escalated: &'static str) -> Self {
        self.rejection = Some(first);
        self.escalation = Some(escalated);
        self
    }

    /// Find an offered suggestion by its exact label.
    pub fn suggestion(&self, label: &str) -> Option<&SuggestedReply> {
        self.suggestions.iter().find(|s| s.label == label)
    }
}

/// A named, ordered dialogue flow.
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub template_type: TemplateType,
    /// Label shown in the top-level menu.
    pub menu_label: &'static str,
    /// Case-sensitive substrings that select this template from free text.
    pub keywords: &'static [&'static str],
    pub steps: Vec<ConversationStep>,
}

impl TemplateDefinition {
    pub fn step(&self, index: usize) -> Option<&ConversationStep> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether `key` is collected by some step of this flow.
    pub fn has_field(&self, key: &str) -> bool {
        self.field_keys().any(|k| k == key)
    }

    pub fn field_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().filter_map(|s| s.field_key)
    }

    /// Whether free text selects this template.
    pub fn matches(&self, utterance: &str) -> bool {
        let trimmed = utterance.trim();
        trimmed == self.template_type.as_str()
            || trimmed == self.menu_label
            || self.keywords.iter().any(|k| trimmed.contains(k))
    }
}
