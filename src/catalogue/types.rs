//! Catalogue result structures

use crate::tip::{Category, ContentRecord, Difficulty, TipId};
use serde::Serialize;
use std::collections::BTreeMap;

/// One page of a (possibly filtered) listing
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub tips: Vec<ContentRecord>,
    /// 1-based page number that was requested
    pub current_page: usize,
    pub total_pages: usize,
    /// Number of tips matching the filter across all pages
    pub total_tips: usize,
}

impl Page {
    /// Slice `[(page-1)*page_size, page*page_size)` out of `matches`.
    ///
    /// Page 0, a zero page size, and pages past the end all yield an
    /// empty slice; the totals still describe the full match set.
    pub fn slice(matches: Vec<ContentRecord>, page: usize, page_size: usize) -> Self {
        let total_tips = matches.len();
        let total_pages = if page_size == 0 {
            0
        } else {
            total_tips.div_ceil(page_size)
        };

        let tips = match page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) {
            Some(start) if page_size > 0 && start < total_tips => {
                matches.into_iter().skip(start).take(page_size).collect()
            }
            _ => Vec::new(),
        };

        Self {
            tips,
            current_page: page,
            total_pages,
            total_tips,
        }
    }
}

/// Number of tips listed in each top-N ranking
pub const TOP_N: usize = 10;

/// Aggregate counts over the whole catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogueStats {
    pub total_tips: usize,
    /// Every category is present, zero when empty
    pub by_category: BTreeMap<Category, usize>,
    /// Every difficulty is present, zero when empty
    pub by_difficulty: BTreeMap<Difficulty, usize>,
    /// Highest view counts first, ties in catalogue order
    pub most_viewed: Vec<TipId>,
    /// Highest download counts first, ties in catalogue order
    pub most_downloaded: Vec<TipId>,
}

impl CatalogueStats {
    pub fn from_records(records: &[ContentRecord]) -> Self {
        let mut by_category: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();
        let mut by_difficulty: BTreeMap<Difficulty, usize> =
            Difficulty::ALL.into_iter().map(|d| (d, 0)).collect();

        for record in records {
            *by_category.entry(record.category).or_default() += 1;
            *by_difficulty.entry(record.difficulty).or_default() += 1;
        }

        Self {
            total_tips: records.len(),
            by_category,
            by_difficulty,
            most_viewed: top_by(records, |r| r.view_count),
            most_downloaded: top_by(records, |r| r.download_count),
        }
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn difficulty_count(&self, difficulty: Difficulty) -> usize {
        self.by_difficulty.get(&difficulty).copied().unwrap_or(0)
    }
}

fn top_by(records: &[ContentRecord], key: impl Fn(&ContentRecord) -> u64) -> Vec<TipId> {
    let mut ranked: Vec<&ContentRecord> = records.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked.into_iter().take(TOP_N).map(|r| r.id.clone()).collect()
}
