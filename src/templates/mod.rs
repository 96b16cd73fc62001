//! Dialogue templates — the flows, their registry, and prompt rendering.
//!
//! A template is a named, ordered list of questions. Each answer fills one
//! field; the terminal step's suggestion triggers synthesis.

pub mod builtin;
pub mod model;
pub mod prompts;
pub mod registry;

pub use model::{ConversationStep, SuggestedReply, TemplateDefinition, TemplateType};
pub use prompts::meta_instruction;
pub use registry::TemplateRegistry;
