//! Storage backends for the tip catalogue
//!
//! The catalogue reaches storage only through the `TipStore` trait.
//! `SqliteTipStore` is the persistent implementation; `SeedFile` and
//! `MemoryStore` are read-only sources.

mod export;
mod seed;
mod sqlite;
mod traits;

pub use export::{category_palette, export_for_design, template_key, DesignBrief, Palette};
pub use seed::{parse_seed, render_seed, SeedFile};
pub use sqlite::{ImportBatchError, ImportReport, SqliteTipStore, IMPORT_BATCH_SIZE};
pub use traits::{MemoryStore, OpenStore, StorageError, StorageResult, TipStore};
