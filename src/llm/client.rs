//! Core LLM client trait

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::types::{Completion, CompletionRequest};

/// Stateless generation client - each call is independent
///
/// `Ok(Completion::Rejected)` means the backend answered but produced no text.
/// `Err` means the backend could not be used at all (transport, auth, bad body).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single generation request (blocking until complete)
    async fn generate(&self, request: CompletionRequest) -> Result<Completion>;

    /// Human-readable backend name for logs
    fn name(&self) -> &str {
        "llm"
    }
}
