//! YAML seed files: a read-only tip source
//!
//! ```yaml
//! tips:
//!   - id: "1"
//!     category: health
//!     difficulty: Easy
//!     content:
//!       title: Drink a glass of water on waking
//!       readTime: 2
//!     tags: [hydration, morning]
//! ```
//!
//! JSON is valid YAML, so exported catalogues load as seeds too.

use super::traits::{StorageResult, TipStore};
use crate::tip::ContentRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    tips: Vec<ContentRecord>,
}

/// Parse seed text into records, in file order
pub fn parse_seed(text: &str) -> StorageResult<Vec<ContentRecord>> {
    let doc: SeedDocument = serde_yaml::from_str(text)?;
    Ok(doc
        .tips
        .into_iter()
        .map(|mut record| {
            record.normalize_timestamps();
            record
        })
        .collect())
}

/// Render records as a seed document
pub fn render_seed(records: &[ContentRecord]) -> StorageResult<String> {
    let doc = SeedDocument {
        tips: records.to_vec(),
    };
    Ok(serde_yaml::to_string(&doc)?)
}

/// A seed file on disk. Read on every load; counters are not persisted.
#[derive(Debug, Clone)]
pub struct SeedFile {
    path: PathBuf,
}

impl SeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TipStore for SeedFile {
    fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_seed(&text)
    }
}
