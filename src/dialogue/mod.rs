//! Guided slot-filling dialogue.

mod copy;
pub mod engine;
pub mod message;
pub mod session;
pub mod state;

pub use engine::{DialogueEngine, StepOutcome, Transition};
pub use message::{BotMessage, MessageKind, UserInput};
pub use session::{ConversationSession, SynthesisJob, Turn};
pub use state::{ConversationState, DialoguePhase};
