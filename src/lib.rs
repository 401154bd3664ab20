//! Tipforge: tip catalogue and batch content enrichment
//!
//! Two services over a catalogue of short advice pieces ("tips") in the
//! health, wealth and happiness categories:
//!
//! - **Catalogue**: an in-memory query engine over the tip collection,
//!   with filtering, search, related tips, sorting, pagination, stats and
//!   view/download counters.
//! - **Enrichment**: a rate-limited, retrying batch pipeline that asks a
//!   text-generation service to expand each tip into marketing material.
//!
//! Storage (SQLite or a YAML seed file) and the text-generation client
//! are reached only through the `TipStore` and `TextGenerator` traits.
//!
//! # Example
//!
//! ```
//! use tipforge::{CatalogueEngine, Category, ContentRecord, Difficulty};
//!
//! let engine = CatalogueEngine::from_records(vec![
//!     ContentRecord::new("1", Category::Health, Difficulty::Easy, "Drink water"),
//! ]);
//! assert_eq!(engine.get_by_category(Category::Health).len(), 1);
//! ```

pub mod catalogue;
pub mod config;
pub mod enrich;
pub mod llm;
pub mod storage;
mod tip;

pub use catalogue::{CatalogueEngine, CatalogueStats, Page, SortMode, TipFilter, TrendingPolicy};
pub use config::{ConfigError, TipforgeConfig};
pub use enrich::{
    BatchReport, CancellationToken, CostEstimate, EnhancementError, EnrichmentConfig,
    EnrichmentPipeline, Platform,
};
pub use llm::{generator_from_config, LlmError, MockGenerator, TextGenerator};
pub use storage::{OpenStore, SeedFile, SqliteTipStore, StorageError, StorageResult, TipStore};
pub use tip::{
    relevance_score, Benefits, Category, ContentRecord, CounterKind, Difficulty,
    EnhancedContent, EnhancementMetadata, EnrichedContent, Implementation, SocialPosts,
    TipContent, TipId, UnknownVariant,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
