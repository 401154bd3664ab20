//! Text-generation client
//!
//! Defines the client trait and request/response types for calling a
//! chat-completions style text-generation service. Two implementations:
//! - `ChatCompletionsClient`: HTTP with a bearer credential (production)
//! - `MockGenerator`: deterministic offline responses and scripted
//!   failures (no credential configured, and tests)
//!
//! Which one is used is decided once, from configuration, by
//! [`generator_from_config`].

mod http;
mod mock;

pub use http::ChatCompletionsClient;
pub use mock::{offline_completion, MockGenerator, OFFLINE_TOKENS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default API root of the hosted service
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
/// Default model identifier
pub const DEFAULT_MODEL: &str = "grok-beta";
/// System message sent with every completion
pub const SYSTEM_PROMPT: &str =
    "You are an expert content creator specializing in health, wealth, and happiness tips.";

/// Per-call generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    /// Ask the service for a JSON object response
    pub json_response: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            json_response: true,
        }
    }
}

/// Text returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Total tokens reported by the service, 0 when not reported
    pub tokens_used: u64,
}

/// Errors from text-generation calls.
///
/// All variants count as a failed call for retry purposes. A response
/// that arrives but cannot be decoded is not an error; it comes back as
/// a [`Completion`] carrying the raw body.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Client trait for text generation.
///
/// Abstracts over transport (HTTP, mock) so the enrichment pipeline
/// doesn't depend on how the service is reached.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError>;
}

/// Text-generation settings from the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Bearer credential; no credential selects the offline generator
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout. Unset means the transport default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let options = CompletionOptions::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: options.model,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl LlmConfig {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..CompletionOptions::default()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// A non-blank credential is present
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Pick the generator for this configuration.
///
/// With a credential: the HTTP client. Without: the offline generator,
/// which answers every prompt with placeholder content and never touches
/// the network.
pub fn generator_from_config(config: &LlmConfig) -> Arc<dyn TextGenerator> {
    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => Arc::new(ChatCompletionsClient::new(
            &config.base_url,
            key,
            config.request_timeout(),
        )),
        None => {
            info!("no text-generation credential configured, using offline generator");
            Arc::new(MockGenerator::offline())
        }
    }
}
