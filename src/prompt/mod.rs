//! Prompt System - instruction text for the generation backend

mod builder;

pub use builder::{InstructionText, PromptBuilder, failure_block};
