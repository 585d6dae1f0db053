//! Scripted LLM client for tests and offline runs

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SheetwrightError};
use crate::llm::client::LlmClient;
use crate::llm::types::{Completion, CompletionRequest};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Rejected(String),
    Error(String),
}

/// Replays scripted replies in order and records every request it sees
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client that answers every call with the same text
    pub fn repeating(text: impl Into<String>, times: usize) -> Self {
        let text = text.into();
        Self::new((0..times).map(|_| MockReply::Text(text.clone())).collect())
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Prompts sent so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|req| req.prompt.clone()).collect())
            .unwrap_or_default()
    }

    /// Full requests sent so far, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: CompletionRequest) -> Result<Completion> {
        self.requests
            .lock()
            .map_err(|e| SheetwrightError::Llm(format!("Mock lock poisoned: {}", e)))?
            .push(request);

        let reply = self
            .replies
            .lock()
            .map_err(|e| SheetwrightError::Llm(format!("Mock lock poisoned: {}", e)))?
            .pop_front();

        match reply {
            Some(MockReply::Text(text)) => Ok(Completion::Text(text)),
            Some(MockReply::Rejected(reason)) => Ok(Completion::Rejected(reason)),
            Some(MockReply::Error(message)) => Err(SheetwrightError::Llm(message)),
            None => Err(SheetwrightError::Llm("Mock client has no replies left".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
