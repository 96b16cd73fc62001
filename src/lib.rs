//! Jium — guided prompt builder.
//!
//! A short templated dialogue collects the inputs a language model needs,
//! validates them, and turns them into one polished artifact.

pub mod admission;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod llm;
pub mod synthesis;
pub mod templates;
pub mod validation;
pub mod web;
