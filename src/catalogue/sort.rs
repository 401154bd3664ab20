//! Sort orders for catalogue listings

use crate::tip::ContentRecord;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// `created_at` descending
    Newest,
    /// `view_count` descending
    Popular,
    /// Views weighted by recency of the last update
    Trending,
    /// Read time ascending
    ReadTime,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortMode::Newest),
            "popular" => Ok(SortMode::Popular),
            "trending" => Ok(SortMode::Trending),
            "readtime" | "read-time" | "read_time" => Ok(SortMode::ReadTime),
            other => Err(format!("unknown sort mode: '{}'", other)),
        }
    }
}

/// Scoring parameters for [`SortMode::Trending`].
///
/// score = views / max(elapsed_ms, epsilon_ms), where elapsed is the time
/// since `updated_at` (an `updated_at` in the future counts as zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingPolicy {
    pub epsilon: Duration,
}

impl Default for TrendingPolicy {
    fn default() -> Self {
        Self {
            epsilon: Duration::from_millis(1),
        }
    }
}

impl TrendingPolicy {
    pub fn new(epsilon: Duration) -> Self {
        Self { epsilon }
    }

    pub fn score(&self, record: &ContentRecord, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - record.updated_at).num_milliseconds().max(0) as f64;
        let floor_ms = (self.epsilon.as_secs_f64() * 1000.0).max(f64::MIN_POSITIVE);
        record.view_count as f64 / elapsed_ms.max(floor_ms)
    }
}

/// Stable sort of `records` by `mode`, evaluated at `now`
pub fn sort_records(
    records: &mut [ContentRecord],
    mode: SortMode,
    trending: &TrendingPolicy,
    now: DateTime<Utc>,
) {
    match mode {
        SortMode::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Popular => records.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortMode::ReadTime => {
            records.sort_by(|a, b| a.content.read_time.cmp(&b.content.read_time))
        }
        SortMode::Trending => records.sort_by(|a, b| {
            trending
                .score(b, now)
                .partial_cmp(&trending.score(a, now))
                .unwrap_or(Ordering::Equal)
        }),
    }
}
