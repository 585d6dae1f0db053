//! Gemini API client implementation
//!
//! This module implements the LlmClient trait for the Generative Language
//! REST API (`models/{model}:generateContent`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{Result, SheetwrightError};
use crate::llm::client::LlmClient;
use crate::llm::types::{Completion, CompletionRequest};

/// Generative Language API base URL
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_API_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Gemini API client
///
/// Holds no credential of its own; every request carries one.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(SheetwrightError::Config("llm.base_url must not be empty".to_string()));
        }
        if config.timeout.is_zero() {
            return Err(SheetwrightError::Config("llm.timeout_ms must be greater than zero".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SheetwrightError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Endpoint for a given model
    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Build the request body for the Gemini API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "safetySettings": request.safety.settings(),
            "generationConfig": {
                "temperature": request.temperature(),
                "maxOutputTokens": request.max_output_tokens
            }
        })
    }

    /// Parse the API response into a Completion
    fn parse_response(&self, body: &Value) -> Completion {
        if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
            return Completion::Rejected(format!("prompt blocked by backend: {}", reason));
        }

        let Some(candidate) = body["candidates"].as_array().and_then(|c| c.first()) else {
            return Completion::Rejected("backend returned no candidates".to_string());
        };

        let mut text = String::new();
        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(t) = part["text"].as_str() {
                    text.push_str(t);
                }
            }
        }

        if text.trim().is_empty() {
            let finish = candidate["finishReason"].as_str().unwrap_or("UNKNOWN");
            return Completion::Rejected(format!("candidate finished with {} and no text", finish));
        }

        Completion::Text(text)
    }

    /// Send a request to the Gemini API
    async fn send_request(&self, request: &CompletionRequest, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", request.credential.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetwrightError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();

        match status.as_u16() {
            401 | 403 => {
                return Err(SheetwrightError::Llm(format!(
                    "Authentication failed ({}): check the API key",
                    status
                )));
            }
            429 => {
                return Err(SheetwrightError::Llm("Rate limited by backend".to_string()));
            }
            _ => {}
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SheetwrightError::Llm(format!("API error {}: {}", status, error_body)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SheetwrightError::Llm(format!("Failed to read response: {}", e)))?;
        decode_body(&text)
    }
}

/// Decode a response body; malformed JSON is a protocol failure
fn decode_body(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: CompletionRequest) -> Result<Completion> {
        if request.credential.is_empty() {
            return Err(SheetwrightError::Llm("No API key provided".to_string()));
        }
        log::debug!("Sending generation request to model {}", request.model);
        let body = self.build_request(&request);
        let response = self.send_request(&request, body).await?;
        Ok(self.parse_response(&response))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
