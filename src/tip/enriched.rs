//! EnrichedContent: generated marketing material derived from one tip

use super::record::TipId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Social media post variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPosts {
    pub twitter: String,
    pub instagram: String,
    pub linkedin: String,
}

/// The JSON body the text-generation service is asked to return.
///
/// Field names match the keys requested in the enhancement prompt.
/// Every field is required; a response missing any of them is treated
/// as unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedContent {
    pub expanded_description: String,
    pub detailed_benefits: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub pro_tips: Vec<String>,
    pub common_mistakes: Vec<String>,
    pub success_metrics: Vec<String>,
    pub related_tips: Vec<String>,
    /// Colours, imagery and mood for visual design tools
    pub visual_description: String,
    pub social_media_posts: SocialPosts,
    pub email_content: String,
    pub landing_page_copy: String,
}

impl EnhancedContent {
    /// Placeholder content used when a response cannot be parsed,
    /// and as the body of offline completions.
    pub fn placeholder() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            expanded_description: "Enhanced description with more detail and context...".into(),
            detailed_benefits: owned(&[
                "Benefit 1: Improved productivity by 25%",
                "Benefit 2: Better work-life balance",
                "Benefit 3: Reduced stress levels",
            ]),
            implementation_steps: owned(&[
                "Step 1: Start with small changes",
                "Step 2: Track your progress",
                "Step 3: Adjust as needed",
            ]),
            pro_tips: owned(&[
                "Pro tip 1: Consistency is key",
                "Pro tip 2: Measure your results",
            ]),
            common_mistakes: owned(&[
                "Mistake 1: Trying to change too much at once",
                "Mistake 2: Not tracking progress",
            ]),
            success_metrics: owned(&[
                "Metric 1: Daily completion rate",
                "Metric 2: Weekly progress score",
            ]),
            related_tips: owned(&[
                "Related tip 1: Morning routine optimization",
                "Related tip 2: Energy management",
            ]),
            visual_description: "Clean, modern design with category-specific colors and icons".into(),
            social_media_posts: SocialPosts {
                twitter: "Transform your life with this simple tip! #BetterDaysBetterTomorrow".into(),
                instagram: "Ready for a positive change? Try this tip today! #BDBT #SelfImprovement"
                    .into(),
                linkedin: "Discover how this simple strategy can improve your professional performance."
                    .into(),
            },
            email_content:
                "Subject: Your daily tip for success\n\nDear reader, here's a powerful tip...".into(),
            landing_page_copy: "Headline: Transform Your Life Today\n\nSection 1: The problem...\nSection 2: The solution...\nSection 3: Take action...".into(),
        }
    }
}

/// Bookkeeping attached to every generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementMetadata {
    /// Wall-clock time spent producing the artifact, retries included
    pub processing_time_ms: u64,
    pub enhanced_at: DateTime<Utc>,
    pub model: String,
    /// Tokens reported by the service (0 when not reported)
    pub tokens: u64,
}

/// One enrichment result for one tip.
///
/// Artifacts are immutable once built. Enhancing the same tip twice
/// yields two artifacts with distinct `id`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedContent {
    pub id: Uuid,
    pub tip_id: TipId,
    pub content: EnhancedContent,
    /// True when the response could not be parsed and placeholder content was used
    #[serde(default)]
    pub degraded: bool,
    pub metadata: EnhancementMetadata,
}

impl EnrichedContent {
    pub fn new(
        tip_id: TipId,
        content: EnhancedContent,
        degraded: bool,
        metadata: EnhancementMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tip_id,
            content,
            degraded,
            metadata,
        }
    }
}
