//! Core content types: tips and the artifacts generated from them

mod enriched;
mod record;
mod relevance;


pub use enriched::{EnhancedContent, EnhancementMetadata, EnrichedContent, SocialPosts};
pub use record::{
    Benefits, Category, ContentRecord, CounterKind, Difficulty, Implementation, TipContent, TipId,
    UnknownVariant,
};
pub use relevance::relevance_score;
