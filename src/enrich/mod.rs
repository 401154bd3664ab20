//! Batch enrichment of tips through a text-generation service
//!
//! `EnrichmentPipeline` turns each tip into an `EnrichedContent` artifact.
//! Calls are spaced by an injected `RateLimiter`, retried with linear
//! backoff, and grouped into batches with a pause between them. A record
//! that still fails after its retries is reported and skipped; the rest
//! of the run continues.

mod cancel;
mod cost;
mod parse;
mod pipeline;
mod prompt;
mod rate_limit;
mod retry;

pub use cancel::CancellationToken;
pub use cost::{estimate_cost, CostEstimate, DEFAULT_COST_PER_1K_TOKENS};
pub use parse::{extract_json, parse_enhanced_content, parse_platform_output};
pub use pipeline::{BatchReport, ContentVariation, EnrichmentPipeline, PlatformContent};
pub use prompt::{enhancement_prompt, platform_prompt, Platform};
pub use rate_limit::{interval_quota, IntervalLimiter, RateLimiter};
pub use retry::{retry_with_backoff, RetryPolicy};

use crate::llm::LlmError;
use crate::tip::TipId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline settings from the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Minimum spacing between consecutive service calls
    pub rate_limit_delay_ms: u64,
    /// Retries per call after the first attempt
    pub max_retries: u32,
    /// Records per batch; a pause of twice the rate-limit delay separates batches
    pub batch_size: usize,
    pub cost_per_1k_tokens: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 1000,
            max_retries: 3,
            batch_size: 10,
            cost_per_1k_tokens: DEFAULT_COST_PER_1K_TOKENS,
        }
    }
}

impl EnrichmentConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        self.rate_limit_delay() * 2
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.rate_limit_delay())
    }
}

/// Failure to enrich one tip
#[derive(Debug, thiserror::Error)]
pub enum EnhancementError {
    #[error("enhancement of tip {tip_id} failed: {source}")]
    Generation {
        tip_id: TipId,
        #[source]
        source: LlmError,
    },

    #[error("enhancement of tip {tip_id} cancelled")]
    Cancelled { tip_id: TipId },
}

impl EnhancementError {
    /// The tip the failure belongs to
    pub fn tip_id(&self) -> &TipId {
        match self {
            EnhancementError::Generation { tip_id, .. } => tip_id,
            EnhancementError::Cancelled { tip_id } => tip_id,
        }
    }
}
