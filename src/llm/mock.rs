//! Offline and scripted text generation

use super::{Completion, CompletionOptions, LlmError, TextGenerator};
use crate::tip::EnhancedContent;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Tokens reported by an offline completion
pub const OFFLINE_TOKENS: u64 = 500;

/// The completion returned when no service is configured: the default
/// enhanced content as a JSON object.
pub fn offline_completion() -> Completion {
    Completion {
        text: serde_json::to_string(&EnhancedContent::placeholder()).unwrap_or_default(),
        tokens_used: OFFLINE_TOKENS,
    }
}

/// Generator that never touches the network.
///
/// Scripted outcomes are returned in order, one per call. Once the script
/// runs out, every call returns [`offline_completion`]. An unscripted
/// `MockGenerator::offline()` is the credential-less fallback and keeps
/// no prompt history; `recording()` keeps every prompt for inspection.
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<Completion, LlmError>>>,
    calls: AtomicUsize,
    prompts: Option<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn offline() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            prompts: None,
        }
    }

    /// Like `offline`, but remembers every prompt
    pub fn recording() -> Self {
        Self {
            prompts: Some(Mutex::new(Vec::new())),
            ..Self::offline()
        }
    }

    /// Queue a successful completion
    pub fn with_response(self, text: impl Into<String>, tokens_used: u64) -> Self {
        self.script.lock().unwrap().push_back(Ok(Completion {
            text: text.into(),
            tokens_used,
        }));
        self
    }

    /// Queue a failed call
    pub fn with_failure(self, error: LlmError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue `n` consecutive transport failures
    pub fn with_failures(mut self, n: usize) -> Self {
        for i in 0..n {
            self = self.with_failure(LlmError::Transport(format!("scripted failure {}", i + 1)));
        }
        self
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order. Empty unless recording.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .as_ref()
            .map(|p| p.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::offline()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn complete(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(prompts) = &self.prompts {
            prompts.lock().unwrap().push(prompt.to_string());
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(offline_completion()))
    }
}
