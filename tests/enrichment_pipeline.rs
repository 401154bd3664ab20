//! Batch enrichment runs against offline and scripted generators

mod common;

use async_trait::async_trait;
use common::generators::{CancelsAfter, FailsFor};
use common::limiters::PacedLimiter;
use common::{enhanced_json, numbered_catalogue, sample_catalogue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tipforge::enrich::RateLimiter;
use tipforge::llm::{CompletionOptions, LlmConfig, MockGenerator};
use tipforge::{
    generator_from_config, CancellationToken, EnhancedContent, EnhancementError,
    EnrichmentConfig, EnrichmentPipeline, TipId,
};

fn no_delay() -> EnrichmentConfig {
    EnrichmentConfig {
        rate_limit_delay_ms: 0,
        ..Default::default()
    }
}

fn pipeline_with(
    generator: Arc<dyn tipforge::TextGenerator>,
    config: EnrichmentConfig,
) -> EnrichmentPipeline {
    EnrichmentPipeline::new(generator, CompletionOptions::default(), config)
}

/// Default settings, with the one-second spacing kept on tokio's clock
fn paced(generator: Arc<dyn tipforge::TextGenerator>) -> EnrichmentPipeline {
    let config = EnrichmentConfig::default();
    let limiter = PacedLimiter::new(config.rate_limit_delay());
    pipeline_with(generator, config).with_rate_limiter(limiter)
}

#[tokio::test(start_paused = true)]
async fn progress_reports_cumulative_counts_per_batch() {
    let pipeline = paced(Arc::new(MockGenerator::offline()));
    let records = numbered_catalogue(23);
    let mut progress = Vec::new();

    let report = pipeline
        .enhance_all_with_progress(&records, |done, total| progress.push((done, total)))
        .await;

    assert_eq!(progress, vec![(10, 23), (20, 23), (23, 23)]);
    assert_eq!(report.enriched.len(), 23);
    assert_eq!(report.attempted, 23);
    assert!(report.is_complete());
}

#[tokio::test]
async fn artifacts_follow_input_order() {
    let pipeline = pipeline_with(Arc::new(MockGenerator::offline()), no_delay());
    let records = sample_catalogue();

    let report = pipeline.enhance_all(&records).await;

    let produced: Vec<&TipId> = report.enriched.iter().map(|a| &a.tip_id).collect();
    let expected: Vec<&TipId> = records.iter().map(|r| &r.id).collect();
    assert_eq!(produced, expected);
}

#[tokio::test]
async fn without_credential_enhance_is_offline_and_complete() {
    let generator = generator_from_config(&LlmConfig::default());
    let pipeline = pipeline_with(generator, no_delay());
    let record = &sample_catalogue()[0];

    let artifact = pipeline.enhance(record).await.unwrap();

    assert_eq!(artifact.tip_id, record.id);
    assert!(!artifact.degraded);
    assert!(!artifact.content.expanded_description.is_empty());
    assert_eq!(artifact.content.detailed_benefits.len(), 3);
    assert!(!artifact.content.social_media_posts.twitter.is_empty());
    assert_eq!(artifact.metadata.tokens, 500);
}

#[tokio::test]
async fn non_json_body_resolves_with_default_content() {
    let generator = Arc::new(MockGenerator::offline().with_response("<html>502</html>", 0));
    let pipeline = pipeline_with(generator, no_delay());

    let artifact = pipeline.enhance(&sample_catalogue()[0]).await.unwrap();

    assert!(artifact.degraded);
    assert_eq!(artifact.content, EnhancedContent::placeholder());
}

#[tokio::test]
async fn well_formed_response_is_used() {
    let generator = Arc::new(
        MockGenerator::offline().with_response(enhanced_json("Water is life."), 1234),
    );
    let pipeline = pipeline_with(generator, no_delay());

    let artifact = pipeline.enhance(&sample_catalogue()[0]).await.unwrap();

    assert!(!artifact.degraded);
    assert_eq!(artifact.content.expanded_description, "Water is life.");
    assert_eq!(artifact.metadata.tokens, 1234);
}

#[tokio::test(start_paused = true)]
async fn failing_record_is_skipped_and_reported() {
    let generator = Arc::new(FailsFor::new("Automate savings"));
    let pipeline = paced(generator.clone());
    let records = sample_catalogue();

    let report = pipeline.enhance_all(&records).await;

    assert_eq!(report.enriched.len(), records.len() - 1);
    assert!(report.enriched.iter().all(|a| a.tip_id.as_str() != "w1"));
    assert_eq!(report.failed_ids(), vec![&TipId::from("w1")]);
    assert!(matches!(
        report.failures[0],
        EnhancementError::Generation { .. }
    ));
    assert!(!report.cancelled);
    // six successes plus one attempt and three retries for the failure
    assert_eq!(generator.calls.load(Ordering::SeqCst), 6 + 4);
}

#[tokio::test]
async fn cancellation_stops_between_records() {
    let token = CancellationToken::new();
    let generator = Arc::new(CancelsAfter {
        after: 3,
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });
    let pipeline = pipeline_with(generator.clone(), no_delay()).with_cancellation(token);
    let mut progress = Vec::new();

    let report = pipeline
        .enhance_all_with_progress(&numbered_catalogue(25), |done, total| {
            progress.push((done, total))
        })
        .await;

    assert!(report.cancelled);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.enriched.len(), 3);
    assert!(progress.is_empty());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancellation_before_batch_pause() {
    let token = CancellationToken::new();
    let generator = Arc::new(CancelsAfter {
        after: 10,
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });
    let pipeline = pipeline_with(generator, no_delay()).with_cancellation(token);
    let mut progress = Vec::new();

    let report = pipeline
        .enhance_all_with_progress(&numbered_catalogue(25), |done, total| {
            progress.push((done, total))
        })
        .await;

    assert!(report.cancelled);
    assert_eq!(progress, vec![(10, 25)]);
    assert_eq!(report.enriched.len(), 10);
}

/// Counts acquisitions without waiting
#[derive(Default)]
struct CountingLimiter {
    acquired: Mutex<usize>,
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn acquire(&self) {
        *self.acquired.lock().unwrap() += 1;
    }
}

#[tokio::test(start_paused = true)]
async fn every_call_passes_the_limiter() {
    let limiter = Arc::new(CountingLimiter::default());
    let generator = Arc::new(MockGenerator::offline().with_failures(2));
    let pipeline = pipeline_with(generator.clone(), EnrichmentConfig::default())
        .with_rate_limiter(limiter.clone());

    let report = pipeline.enhance_all(&numbered_catalogue(3)).await;

    assert_eq!(report.enriched.len(), 3);
    assert_eq!(generator.call_count(), 5);
    assert_eq!(*limiter.acquired.lock().unwrap(), 5);
}

#[tokio::test]
async fn empty_input_runs_cleanly() {
    let pipeline = pipeline_with(Arc::new(MockGenerator::offline()), no_delay());
    let mut calls = 0;

    let report = pipeline
        .enhance_all_with_progress(&[], |_, _| calls += 1)
        .await;

    assert!(report.enriched.is_empty());
    assert_eq!(calls, 0);
    assert!(report.is_complete());
}

#[test]
fn empty_cost_estimate_is_zero() {
    let pipeline = pipeline_with(Arc::new(MockGenerator::offline()), no_delay());
    let estimate = pipeline.estimate_cost(&[]);

    assert_eq!(estimate.total_tokens, 0);
    assert_eq!(estimate.estimated_cost, 0.0);
    assert!(estimate.processing_time.is_zero());
}

#[tokio::test]
async fn cost_of_a_run() {
    let pipeline = pipeline_with(Arc::new(MockGenerator::offline()), no_delay());
    let report = pipeline.enhance_all(&numbered_catalogue(4)).await;

    let estimate = pipeline.estimate_cost(&report.enriched);
    assert_eq!(estimate.total_tokens, 2000);
    assert!((estimate.estimated_cost - 0.002).abs() < 1e-12);
}

#[tokio::test(start_paused = true)]
async fn spacing_between_calls_is_not_billed_as_processing_time() {
    let pipeline = paced(Arc::new(MockGenerator::offline()));
    let started = tokio::time::Instant::now();

    let report = pipeline.enhance_all(&numbered_catalogue(4)).await;

    // three one-second gaps between four calls
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(report
        .enriched
        .iter()
        .all(|a| a.metadata.processing_time_ms <= 1));
    let estimate = pipeline.estimate_cost(&report.enriched);
    assert!(estimate.processing_time < Duration::from_millis(10));
}

#[cfg(feature = "real_llm")]
#[tokio::test]
async fn live_service_enhances_one_tip() {
    let mut config = tipforge::TipforgeConfig::default();
    config.apply_overrides(|name| std::env::var(name).ok());
    assert!(config.llm.has_credential(), "set TIPFORGE_API_KEY or XAI_API_KEY");

    let pipeline = EnrichmentPipeline::new(
        generator_from_config(&config.llm),
        config.llm.completion_options(),
        config.enrichment.clone(),
    );
    let artifact = pipeline.enhance(&sample_catalogue()[0]).await.unwrap();
    assert!(artifact.metadata.tokens > 0);
}
