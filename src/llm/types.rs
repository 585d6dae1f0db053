//! LLM types for generation backend communication
//!
//! This module defines the request and response shapes shared by every
//! generation client.

use serde::{Deserialize, Serialize};

/// Opaque API credential for the generation backend
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw API key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Expose the raw key for the transport layer
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check whether any key was provided
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Content-safety category understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

/// Blocking threshold for a safety category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
}

/// One category/threshold pair sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Safety configuration for a generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetySettings(Vec<SafetySetting>);

impl SafetySettings {
    /// Spreadsheet requests have no business tripping these filters, so all
    /// four categories are set to BLOCK_NONE.
    pub fn relaxed() -> Self {
        Self(
            [
                HarmCategory::HarmCategoryHarassment,
                HarmCategory::HarmCategoryHateSpeech,
                HarmCategory::HarmCategorySexuallyExplicit,
                HarmCategory::HarmCategoryDangerousContent,
            ]
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: HarmBlockThreshold::BlockNone,
            })
            .collect(),
        )
    }

    pub fn settings(&self) -> &[SafetySetting] {
        &self.0
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// Lowest randomness setting; repeated attempts stay as reproducible as possible
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

/// Default output cap for one generation
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8000;

/// Request to the generation backend
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub credential: Credential,
    pub safety: SafetySettings,
    temperature: f32,
    pub max_output_tokens: u32,
}

impl CompletionRequest {
    /// Create a deterministic request with relaxed safety settings
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, credential: Credential) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            credential,
            safety: SafetySettings::relaxed(),
            temperature: DETERMINISTIC_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Set max output tokens
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Sampling temperature; always deterministic
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// What the backend produced for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Raw generated text
    Text(String),
    /// Backend returned no generated content
    Rejected(String),
}

impl Completion {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Completion::Rejected(_))
    }
}
