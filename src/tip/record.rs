//! ContentRecord: a single catalogued tip

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a tip
///
/// Opaque: serializes as a plain string whether the backing store
/// hands out integers or slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipId(String);

impl TipId {
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TipId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for TipId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// Returned when a string names no known category, difficulty or platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Wealth,
    Happiness,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Health, Category::Wealth, Category::Happiness];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Wealth => "wealth",
            Category::Happiness => "happiness",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "difficulty",
                value: s.to_string(),
            })
    }
}

/// Which engagement counter an increment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    View,
    Download,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefits {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

/// How a tip is put into practice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub time: String,
    pub frequency: String,
    pub cost: String,
}

/// Narrative fields of a tip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipContent {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub whats_included: Vec<String>,
    /// Estimated read time in minutes
    #[serde(default)]
    pub read_time: u32,
    #[serde(default)]
    pub benefits: Benefits,
}

/// A single tip in the catalogue
///
/// Counters only move through [`ContentRecord::increment`], which also
/// bumps `updated_at`. `updated_at` never precedes `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: TipId,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub difficulty: Difficulty,
    pub content: TipContent,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Implementation>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn new(
        id: impl Into<TipId>,
        category: Category,
        difficulty: Difficulty,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            category,
            subcategory: None,
            difficulty,
            content: TipContent {
                title: title.into(),
                ..Default::default()
            },
            tags: Vec::new(),
            implementation: None,
            view_count: 0,
            download_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.content.subtitle = subtitle.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.content.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_read_time(mut self, minutes: u32) -> Self {
        self.content.read_time = minutes;
        self
    }

    pub fn with_benefits(
        mut self,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        self.content.benefits = Benefits {
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        };
        self
    }

    pub fn with_implementation(
        mut self,
        time: impl Into<String>,
        frequency: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        self.implementation = Some(Implementation {
            time: time.into(),
            frequency: frequency.into(),
            cost: cost.into(),
        });
        self
    }

    /// Set both timestamps (`updated_at` is clamped to `created_at`)
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.normalize_timestamps();
        self
    }

    pub fn with_counts(mut self, views: u64, downloads: u64) -> Self {
        self.view_count = views;
        self.download_count = downloads;
        self
    }

    pub fn counter(&self, kind: CounterKind) -> u64 {
        match kind {
            CounterKind::View => self.view_count,
            CounterKind::Download => self.download_count,
        }
    }

    /// Add one to a counter and stamp `updated_at`
    pub fn increment(&mut self, kind: CounterKind, now: DateTime<Utc>) {
        match kind {
            CounterKind::View => self.view_count = self.view_count.saturating_add(1),
            CounterKind::Download => self.download_count = self.download_count.saturating_add(1),
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Restore `updated_at >= created_at` for records loaded from outside
    pub fn normalize_timestamps(&mut self) {
        if self.updated_at < self.created_at {
            self.updated_at = self.created_at;
        }
    }

    /// Case-insensitive substring match over title, subtitle, description and tags.
    ///
    /// `needle` must already be lowercase. An empty needle matches.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.content.title.to_lowercase().contains(needle)
            || self.content.subtitle.to_lowercase().contains(needle)
            || self.content.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Health".parse::<Category>().unwrap(), Category::Health);
        assert_eq!("wealth".parse::<Category>().unwrap(), Category::Wealth);
        assert!("fitness".parse::<Category>().is_err());
    }

    #[test]
    fn difficulty_parses_and_displays() {
        let d: Difficulty = "moderate".parse().unwrap();
        assert_eq!(d, Difficulty::Moderate);
        assert_eq!(d.to_string(), "Moderate");
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.kind, "difficulty");
    }

    #[test]
    fn increment_bumps_counter_and_updated_at() {
        let created = Utc::now() - Duration::days(3);
        let mut record = ContentRecord::new("t1", Category::Health, Difficulty::Easy, "Walk")
            .with_timestamps(created, created);
        let now = Utc::now();

        record.increment(CounterKind::View, now);
        record.increment(CounterKind::Download, now);

        assert_eq!(record.view_count, 1);
        assert_eq!(record.download_count, 1);
        assert_eq!(record.updated_at, now);
        assert_eq!(record.created_at, created);
    }

    #[test]
    fn increment_never_moves_updated_at_before_created_at() {
        let created = Utc::now();
        let mut record = ContentRecord::new("t1", Category::Health, Difficulty::Easy, "Walk")
            .with_timestamps(created, created);

        record.increment(CounterKind::View, created - Duration::hours(1));
        assert_eq!(record.updated_at, created);
    }

    #[test]
    fn with_timestamps_clamps_updated_at() {
        let created = Utc::now();
        let record = ContentRecord::new("t1", Category::Wealth, Difficulty::Easy, "Budget")
            .with_timestamps(created, created - Duration::days(1));
        assert_eq!(record.updated_at, created);
    }

    #[test]
    fn search_covers_tags() {
        let record = ContentRecord::new("t1", Category::Health, Difficulty::Easy, "Stretch daily")
            .with_tags(["Yoga", "mobility"]);
        assert!(record.matches_search("yoga"));
        assert!(record.matches_search("stretch"));
        assert!(!record.matches_search("budget"));
        assert!(record.matches_search(""));
    }
}
