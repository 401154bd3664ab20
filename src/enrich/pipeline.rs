//! EnrichmentPipeline: tips in, generated artifacts out

use super::cancel::CancellationToken;
use super::cost::{estimate_cost, CostEstimate};
use super::parse::{parse_enhanced_content, parse_platform_output};
use super::prompt::{enhancement_prompt, platform_prompt, Platform};
use super::rate_limit::{IntervalLimiter, RateLimiter};
use super::retry::retry_with_backoff;
use super::{EnhancementError, EnrichmentConfig};
use crate::llm::{Completion, CompletionOptions, TextGenerator};
use crate::tip::{ContentRecord, EnhancementMetadata, EnrichedContent, TipId};
use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of a batch run.
///
/// `enriched` holds every artifact produced, in input order. Each record
/// that failed after its retries has one entry in `failures`.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub enriched: Vec<EnrichedContent>,
    pub failures: Vec<EnhancementError>,
    /// Records handed to the service, successful or not
    pub attempted: usize,
    /// The run stopped early on a cancellation request
    pub cancelled: bool,
}

impl BatchReport {
    pub fn failed_ids(&self) -> Vec<&TipId> {
        self.failures.iter().map(EnhancementError::tip_id).collect()
    }

    /// Every record was attempted and none failed
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }
}

/// One of several independently generated versions of a tip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentVariation {
    /// 1-based
    pub version: u32,
    pub content: EnrichedContent,
}

/// Enhanced content reworked for one output surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformContent {
    pub tip_id: TipId,
    pub platform: Platform,
    /// The JSON object returned by the service
    pub body: serde_json::Value,
    pub degraded: bool,
    pub metadata: EnhancementMetadata,
}

/// Turns tips into enriched artifacts through a [`TextGenerator`].
///
/// Records are processed one at a time. Every call to the service first
/// passes the rate limiter, and failed calls are retried per
/// [`EnrichmentConfig::retry_policy`].
pub struct EnrichmentPipeline {
    generator: Arc<dyn TextGenerator>,
    limiter: Arc<dyn RateLimiter>,
    options: CompletionOptions,
    config: EnrichmentConfig,
    cancel: CancellationToken,
}

impl EnrichmentPipeline {
    /// Uses an [`IntervalLimiter`] at the configured rate-limit delay
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        options: CompletionOptions,
        config: EnrichmentConfig,
    ) -> Self {
        let limiter = Arc::new(IntervalLimiter::new(config.rate_limit_delay()));
        Self {
            generator,
            limiter,
            options,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels runs of this pipeline
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Rate-limited, retried call to the service.
    ///
    /// Also returns the time spent waiting on the rate limiter.
    async fn generate(
        &self,
        tip_id: &TipId,
        prompt: &str,
    ) -> Result<(Completion, Duration), EnhancementError> {
        let policy = self.config.retry_policy();
        let throttled = Mutex::new(Duration::ZERO);
        let throttled_ref = &throttled;

        let completion = retry_with_backoff(&policy, move |attempt| async move {
            let waiting = Instant::now();
            self.limiter.acquire().await;
            *throttled_ref.lock().unwrap() += waiting.elapsed();

            debug!(tip_id = %tip_id, attempt, "calling text generation service");
            self.generator.complete(prompt, &self.options).await
        })
        .await
        .map_err(|source| EnhancementError::Generation {
            tip_id: tip_id.clone(),
            source,
        })?;

        let throttled = *throttled.lock().unwrap();
        Ok((completion, throttled))
    }

    /// Processing time covers prompt building, service calls, retry
    /// backoff and decoding. Rate-limiter waits are excluded.
    fn metadata(&self, started: Instant, throttled: Duration, tokens: u64) -> EnhancementMetadata {
        EnhancementMetadata {
            processing_time_ms: started.elapsed().saturating_sub(throttled).as_millis() as u64,
            enhanced_at: Utc::now(),
            model: self.options.model.clone(),
            tokens,
        }
    }

    /// Enrich one tip.
    ///
    /// Fails only when the service call fails after every retry. A
    /// response that cannot be decoded yields placeholder content with
    /// `degraded` set.
    pub async fn enhance(&self, record: &ContentRecord) -> Result<EnrichedContent, EnhancementError> {
        let started = Instant::now();
        let prompt = enhancement_prompt(record);
        let (completion, throttled) = self.generate(&record.id, &prompt).await?;

        let (content, degraded) = parse_enhanced_content(&completion.text);
        if degraded {
            warn!(tip_id = %record.id, "response did not match the content shape, using defaults");
        }

        let metadata = self.metadata(started, throttled, completion.tokens_used);
        debug!(
            tip_id = %record.id,
            tokens = metadata.tokens,
            processing_time_ms = metadata.processing_time_ms,
            "tip enhanced"
        );
        Ok(EnrichedContent::new(record.id.clone(), content, degraded, metadata))
    }

    /// Enrich every record, in batches.
    pub async fn enhance_all(&self, records: &[ContentRecord]) -> BatchReport {
        self.enhance_all_with_progress(records, |_, _| {}).await
    }

    /// Enrich every record, calling `on_progress(processed, total)` after
    /// each batch.
    ///
    /// `processed` counts records attempted so far, including failures.
    /// Batches are separated by a pause of twice the rate-limit delay. The
    /// cancellation token is checked before each record and before each
    /// pause; a cancelled run returns what it has, without a progress call
    /// for the unfinished batch.
    pub async fn enhance_all_with_progress<F>(
        &self,
        records: &[ContentRecord],
        mut on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = records.len();
        let batch_size = self.config.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);
        let mut report = BatchReport::default();

        info!(total, batch_size, batch_count, "starting enrichment run");

        'batches: for (index, batch) in records.chunks(batch_size).enumerate() {
            for record in batch {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break 'batches;
                }

                report.attempted += 1;
                match self.enhance(record).await {
                    Ok(artifact) => report.enriched.push(artifact),
                    Err(e) => {
                        error!(tip_id = %record.id, error = %e, "enhancement failed, skipping tip");
                        report.failures.push(e);
                    }
                }
            }

            on_progress(report.attempted, total);
            info!(
                processed = report.attempted,
                total,
                batch = index + 1,
                batch_count,
                "batch complete"
            );

            if index + 1 < batch_count {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                tokio::time::sleep(self.config.batch_pause()).await;
            }
        }

        if report.cancelled {
            info!(
                processed = report.attempted,
                total, "enrichment run cancelled"
            );
        } else {
            info!(
                enriched = report.enriched.len(),
                failed = report.failures.len(),
                "enrichment run finished"
            );
        }
        report
    }

    /// Generate `count` independent versions of one tip.
    ///
    /// Stops at the first failure.
    pub async fn generate_variations(
        &self,
        record: &ContentRecord,
        count: u32,
    ) -> Result<Vec<ContentVariation>, EnhancementError> {
        let mut variations = Vec::with_capacity(count as usize);
        for version in 1..=count {
            self.cancel.check(&record.id)?;
            let content = self.enhance(record).await?;
            variations.push(ContentVariation { version, content });
        }
        Ok(variations)
    }

    /// Rework already enhanced content for one platform.
    ///
    /// Retries and degraded decoding work as in [`enhance`](Self::enhance).
    /// Fails with `Cancelled` if the token is already cancelled.
    pub async fn optimize_for_platform(
        &self,
        enriched: &EnrichedContent,
        platform: Platform,
    ) -> Result<PlatformContent, EnhancementError> {
        self.cancel.check(&enriched.tip_id)?;
        let started = Instant::now();
        let prompt = platform_prompt(&enriched.content, platform);
        let (completion, throttled) = self.generate(&enriched.tip_id, &prompt).await?;

        let (body, degraded) = parse_platform_output(&completion.text);
        if degraded {
            warn!(tip_id = %enriched.tip_id, %platform, "platform response was not JSON, using defaults");
        }

        Ok(PlatformContent {
            tip_id: enriched.tip_id.clone(),
            platform,
            body,
            degraded,
            metadata: self.metadata(started, throttled, completion.tokens_used),
        })
    }

    /// Totals over `artifacts` at the configured token price
    pub fn estimate_cost(&self, artifacts: &[EnrichedContent]) -> CostEstimate {
        estimate_cost(artifacts, self.config.cost_per_1k_tokens)
    }
}
