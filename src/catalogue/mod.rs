//! Catalogue query engine
//!
//! Answers filter, search, sort, related-tip, pagination and statistics
//! queries over an in-memory collection loaded once from a [`TipStore`].
//!
//! [`TipStore`]: crate::storage::TipStore

mod engine;
mod filter;
mod sort;
mod types;

pub use engine::{CatalogueEngine, DEFAULT_RELATED_COUNT};
pub use filter::{Criterion, TipFilter};
pub use sort::{sort_records, SortMode, TrendingPolicy};
pub use types::{CatalogueStats, Page, TOP_N};
