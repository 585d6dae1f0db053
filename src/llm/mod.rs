//! LLM Client Layer - generation backend integration
//!
//! This module provides:
//! - Request/response types for generation calls
//! - LlmClient trait for backend abstraction
//! - GeminiClient implementation
//! - MockLlmClient for tests and offline runs

pub mod client;
pub mod gemini;
pub mod mock;
pub mod types;

pub use client::LlmClient;
pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::{MockLlmClient, MockReply};
pub use types::{
    Completion, CompletionRequest, Credential, HarmBlockThreshold, HarmCategory, SafetySetting, SafetySettings,
};
