//! Conversation state — the value threaded through every dialogue step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::templates::{TemplateRegistry, TemplateType};

/// The phases of a guided conversation.
///
/// Idle → Collecting → AwaitingConfirmation → Synthesizing → Idle, with
/// Failed → Idle when synthesis is refused or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    #[default]
    Idle,
    Collecting,
    AwaitingConfirmation,
    Synthesizing,
    Failed,
}

impl DialoguePhase {
    /// Check if a transition from `self` to `target` is one the engine makes.
    ///
    /// Any phase may fall back to Idle on restart. A trigger suggestion may
    /// start synthesis from any step of a chosen template.
    pub fn can_transition_to(&self, target: DialoguePhase) -> bool {
        use DialoguePhase::*;
        matches!(
            (self, target),
            (_, Idle)
                | (Idle, Collecting)
                | (Collecting, Collecting)
                | (Collecting, AwaitingConfirmation)
                | (Collecting, Synthesizing)
                | (AwaitingConfirmation, AwaitingConfirmation)
                | (AwaitingConfirmation, Synthesizing)
                | (Synthesizing, Failed)
        )
    }
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Synthesizing => "synthesizing",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Where one conversation stands.
///
/// Produced only by the dialogue engine; callers hold it and pass it back in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<TemplateType>,
    #[serde(default)]
    pub step_index: usize,
    #[serde(default)]
    pub collected_inputs: BTreeMap<String, String>,
    /// Field whose last answer was rejected as too short.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_field: Option<String>,
}

impl ConversationState {
    /// Fresh state positioned on the first step of `template_type`.
    pub fn for_template(template_type: TemplateType) -> Self {
        Self {
            template_type: Some(template_type),
            ..Self::default()
        }
    }

    /// The phase this state rests in between steps.
    pub fn phase(&self, registry: &TemplateRegistry) -> DialoguePhase {
        let step = self
            .template_type
            .and_then(|t| registry.get(t))
            .and_then(|def| def.step(self.step_index));
        match step {
            None => DialoguePhase::Idle,
            Some(s) if s.terminal => DialoguePhase::AwaitingConfirmation,
            Some(_) => DialoguePhase::Collecting,
        }
    }

    /// Verify the state could have been produced by the engine for `registry`.
    pub fn check_consistent(&self, registry: &TemplateRegistry) -> Result<(), String> {
        let Some(tt) = self.template_type else {
            if self.step_index != 0 || !self.collected_inputs.is_empty() || self.rejected_field.is_some() {
                return Err("idle state carries progress".to_string());
            }
            return Ok(());
        };
        let def = registry
            .get(tt)
            .ok_or_else(|| format!("template '{tt}' is not registered"))?;

        if self.step_index >= def.step_count() {
            return Err(format!(
                "step {} out of range for '{tt}' ({} steps)",
                self.step_index,
                def.step_count()
            ));
        }
        if let Some(key) = self.collected_inputs.keys().find(|k| !def.has_field(k)) {
            return Err(format!("field '{key}' is not collected by '{tt}'"));
        }
        if let Some(field) = &self.rejected_field {
            if !def.has_field(field) {
                return Err(format!("rejected field '{field}' is not collected by '{tt}'"));
            }
        }
        Ok(())
    }

    pub fn is_consistent(&self, registry: &TemplateRegistry) -> bool {
        self.check_consistent(registry).is_ok()
    }
}
