//! Chat-completions HTTP client

use super::{Completion, CompletionOptions, LlmError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

/// Build the client, falling back to reqwest's defaults on failure
fn build_http_client(builder: reqwest::ClientBuilder) -> reqwest::Client {
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "failed to build HTTP client, using defaults without the configured timeout");
            reqwest::Client::default()
        }
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionsClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ChatCompletionsClient {
    /// `timeout` of `None` leaves the transport default in place
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().user_agent("tipforge/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            http_client: build_http_client(builder),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(prompt: &'a str, options: &'a CompletionOptions) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        ChatRequest {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    /// Turn a 2xx body into a completion.
    ///
    /// A body that is not the expected envelope is passed through as raw
    /// text so the caller can fall back to placeholder content.
    fn decode_body(body: &str) -> Completion {
        match serde_json::from_str::<ChatResponse>(body) {
            Ok(response) => Completion {
                text: response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default(),
                tokens_used: response.usage.map_or(0, |u| u.total_tokens),
            },
            Err(e) => {
                debug!(error = %e, "completion body is not a chat response envelope");
                Completion {
                    text: body.to_string(),
                    tokens_used: 0,
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let request = Self::build_request(prompt, options);

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self::decode_body(&body))
    }
}
