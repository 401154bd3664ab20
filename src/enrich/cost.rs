//! Token and cost accounting over generated artifacts

use crate::tip::EnrichedContent;
use serde::Serialize;
use std::time::Duration;

/// Price per 1000 tokens used when none is configured
pub const DEFAULT_COST_PER_1K_TOKENS: f64 = 0.001;

/// Totals over a set of artifacts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub total_tokens: u64,
    pub estimated_cost: f64,
    #[serde(serialize_with = "serialize_millis", rename = "processingTimeMs")]
    pub processing_time: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Sum tokens and processing time, and price the tokens at
/// `cost_per_1k_tokens`.
pub fn estimate_cost<'a, I>(artifacts: I, cost_per_1k_tokens: f64) -> CostEstimate
where
    I: IntoIterator<Item = &'a EnrichedContent>,
{
    let (total_tokens, total_ms) = artifacts.into_iter().fold((0u64, 0u64), |(tokens, ms), a| {
        (
            tokens.saturating_add(a.metadata.tokens),
            ms.saturating_add(a.metadata.processing_time_ms),
        )
    });

    CostEstimate {
        total_tokens,
        estimated_cost: total_tokens as f64 / 1000.0 * cost_per_1k_tokens,
        processing_time: Duration::from_millis(total_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tip::{EnhancedContent, EnhancementMetadata};
    use chrono::Utc;

    fn artifact(tokens: u64, ms: u64) -> EnrichedContent {
        EnrichedContent::new(
            "t".into(),
            EnhancedContent::placeholder(),
            false,
            EnhancementMetadata {
                processing_time_ms: ms,
                enhanced_at: Utc::now(),
                model: "grok-beta".into(),
                tokens,
            },
        )
    }

    #[test]
    fn empty_is_zero() {
        let none: Vec<EnrichedContent> = Vec::new();
        let estimate = estimate_cost(&none, DEFAULT_COST_PER_1K_TOKENS);
        assert_eq!(estimate, CostEstimate::default());
        assert_eq!(estimate.estimated_cost, 0.0);
    }

    #[test]
    fn sums_and_prices() {
        let artifacts = vec![artifact(500, 1200), artifact(1500, 800)];
        let estimate = estimate_cost(&artifacts, DEFAULT_COST_PER_1K_TOKENS);

        assert_eq!(estimate.total_tokens, 2000);
        assert_eq!(estimate.processing_time, Duration::from_millis(2000));
        assert!((estimate.estimated_cost - 0.002).abs() < 1e-12);
    }

    #[test]
    fn serializes_millis() {
        let value = serde_json::to_value(estimate_cost(&[artifact(10, 25)], 1.0)).unwrap();
        assert_eq!(value["processingTimeMs"], 25);
        assert_eq!(value["totalTokens"], 10);
    }
}
