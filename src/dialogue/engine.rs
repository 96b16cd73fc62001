//! Dialogue engine — decides what to ask next.
//!
//! `step` is pure: it reads the current state and one user turn and returns
//! the next state plus the messages to show. When the conversation reaches
//! its trigger, `step` hands back a `SynthesisRequest` instead, and the caller
//! reports the outcome through `complete`.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::SynthesisError;
use crate::synthesis::{SynthesisRequest, SynthesisResult};
use crate::templates::{ConversationStep, SuggestedReply, TemplateDefinition, TemplateRegistry};
use crate::validation::schema_for;

use super::copy;
use super::message::{BotMessage, MessageKind, UserInput};
use super::state::{ConversationState, DialoguePhase};

/// Result of one turn that did not start synthesis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub state: ConversationState,
    pub phase: DialoguePhase,
    pub messages: Vec<BotMessage>,
    /// Replies to offer for the next turn.
    pub suggestions: Vec<SuggestedReply>,
}

/// What the caller must do after a turn.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Show the outcome and wait for the next turn.
    Continue(StepOutcome),
    /// Run the synthesis pipeline, then call `DialogueEngine::complete`.
    Synthesize {
        request: SynthesisRequest,
        messages: Vec<BotMessage>,
    },
}

/// The conversation state machine.
pub struct DialogueEngine {
    registry: Arc<TemplateRegistry>,
}

impl DialogueEngine {
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Greeting plus the template menu.
    pub fn start(&self) -> StepOutcome {
        self.idle(vec![BotMessage::question(copy::GREETING)], DialoguePhase::Idle)
    }

    /// Advance the conversation by one user turn.
    pub fn step(&self, state: &ConversationState, input: &UserInput) -> Transition {
        let utterance = input.utterance().trim();

        if copy::RESTART_KEYWORDS.contains(&utterance) {
            debug!("Conversation restarted");
            return Transition::Continue(self.start());
        }

        let Some(template_type) = state.template_type else {
            return Transition::Continue(self.select(utterance));
        };

        let located = self
            .registry
            .get(template_type)
            .and_then(|def| def.step(state.step_index).map(|step| (def, step)));
        let Some((def, step)) = located else {
            debug!(template = %template_type, step = state.step_index, "State out of range, resetting");
            return Transition::Continue(self.start());
        };

        // Only suggestions this step actually offered count as suggestions.
        let picked = match input {
            UserInput::Suggestion { label } => step.suggestion(label),
            UserInput::Text { .. } => None,
        };

        if step.terminal {
            let trigger = picked.or_else(|| step.suggestion(utterance));
            return match trigger {
                Some(s) if s.triggers_final => self.synthesize(state),
                _ => Transition::Continue(self.ask(state.clone(), step, MessageKind::Question)),
            };
        }
        if picked.is_some_and(|s| s.triggers_final) {
            return self.synthesize(state);
        }

        let Some(key) = step.field_key else {
            return Transition::Continue(self.start());
        };

        if picked.is_none() && self.too_short(def, step, key, utterance) {
            let escalate = state.rejected_field.as_deref() == Some(key);
            debug!(field = key, escalate, "Answer too short");
            let text = if escalate {
                copy::escalation(step)
            } else {
                copy::rejection(step)
            };
            let next = ConversationState {
                rejected_field: Some(key.to_string()),
                ..state.clone()
            };
            return Transition::Continue(StepOutcome {
                state: next,
                phase: DialoguePhase::Collecting,
                messages: vec![BotMessage::new(MessageKind::Rejection, text)],
                suggestions: step.suggestions.clone(),
            });
        }

        let value = picked.map_or(utterance, |s| s.label.as_str());
        let mut next = state.clone();
        next.collected_inputs.insert(key.to_string(), value.to_string());
        next.step_index += 1;
        next.rejected_field = None;

        match def.step(next.step_index) {
            Some(next_step) => Transition::Continue(self.ask(next, next_step, MessageKind::Question)),
            None => Transition::Continue(self.start()),
        }
    }

    /// Turn a synthesis outcome into the closing messages. The conversation
    /// always returns to Idle.
    pub fn complete(&self, result: Result<SynthesisResult, SynthesisError>) -> StepOutcome {
        match result {
            Ok(result) => self.idle(
                vec![
                    BotMessage::new(MessageKind::Final, result.final_artifact),
                    BotMessage::new(MessageKind::Notice, copy::ANOTHER_ROUND),
                ],
                DialoguePhase::Idle,
            ),
            Err(e) => self.idle(
                vec![BotMessage::new(
                    MessageKind::Error,
                    copy::failure(&e.public_detail()),
                )],
                DialoguePhase::Failed,
            ),
        }
    }

    fn select(&self, utterance: &str) -> StepOutcome {
        match self.registry.match_selection(utterance) {
            Some(def) => {
                debug!(template = %def.template_type, "Template selected");
                let state = ConversationState::for_template(def.template_type);
                match def.step(0) {
                    Some(first) => self.ask(state, first, MessageKind::Question),
                    None => self.start(),
                }
            }
            None => self.idle(
                vec![BotMessage::new(MessageKind::Clarification, copy::CLARIFICATION)],
                DialoguePhase::Idle,
            ),
        }
    }

    fn synthesize(&self, state: &ConversationState) -> Transition {
        let template = state
            .template_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();
        Transition::Synthesize {
            request: SynthesisRequest::new(template, state.collected_inputs.clone()),
            messages: vec![BotMessage::new(MessageKind::Notice, copy::GENERATING)],
        }
    }

    /// Whether a typed answer fails the step's minimum. Blank answers always do.
    fn too_short(
        &self,
        def: &TemplateDefinition,
        step: &ConversationStep,
        key: &str,
        utterance: &str,
    ) -> bool {
        let min = step.min_length.unwrap_or(1);
        utterance.chars().count() < min
            && !schema_for(def.template_type).accepts_sentinel(key, utterance)
    }

    fn ask(&self, state: ConversationState, step: &ConversationStep, kind: MessageKind) -> StepOutcome {
        let phase = if step.terminal {
            DialoguePhase::AwaitingConfirmation
        } else {
            DialoguePhase::Collecting
        };
        StepOutcome {
            state,
            phase,
            messages: vec![BotMessage::new(kind, step.question)],
            suggestions: step.suggestions.clone(),
        }
    }

    fn idle(&self, messages: Vec<BotMessage>, phase: DialoguePhase) -> StepOutcome {
        StepOutcome {
            state: ConversationState::default(),
            phase,
            messages,
            suggestions: self.registry.menu(),
        }
    }
}
