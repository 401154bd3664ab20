//! Filter criteria for catalogue queries

use crate::tip::{Category, ContentRecord, Difficulty};
use std::str::FromStr;

/// A single equality criterion.
///
/// `Invalid` holds a value that failed to parse (e.g. a category typed on
/// the command line). It never matches anything; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion<T> {
    Is(T),
    Invalid(String),
}

impl<T: PartialEq> Criterion<T> {
    fn accepts(&self, value: &T) -> bool {
        match self {
            Criterion::Is(expected) => expected == value,
            Criterion::Invalid(_) => false,
        }
    }
}

impl<T: FromStr> Criterion<T> {
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .map(Criterion::Is)
            .unwrap_or_else(|_| Criterion::Invalid(raw.to_string()))
    }
}

/// Conjunctive filter over tips. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipFilter {
    pub category: Option<Criterion<Category>>,
    pub difficulty: Option<Criterion<Difficulty>>,
    /// Case-insensitive substring over title, subtitle, description and tags
    pub search_term: Option<String>,
    /// Matches when the tip carries at least one of these tags
    pub tags: Vec<String>,
}

impl TipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(Criterion::Is(category));
        self
    }

    /// Filter by a category name; unknown names match nothing
    pub fn with_category_str(mut self, raw: &str) -> Self {
        self.category = Some(Criterion::parse(raw));
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(Criterion::Is(difficulty));
        self
    }

    /// Filter by a difficulty name; unknown names match nothing
    pub fn with_difficulty_str(mut self, raw: &str) -> Self {
        self.difficulty = Some(Criterion::parse(raw));
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
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

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.difficulty.is_none()
            && self.search_term.as_deref().map_or(true, str::is_empty)
            && self.tags.is_empty()
    }

    /// Check if a tip satisfies all criteria
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if let Some(ref category) = self.category {
            if !category.accepts(&record.category) {
                return false;
            }
        }

        if let Some(ref difficulty) = self.difficulty {
            if !difficulty.accepts(&record.difficulty) {
                return false;
            }
        }

        if let Some(ref term) = self.search_term {
            if !record.matches_search(&term.to_lowercase()) {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|tag| record.tags.contains(tag)) {
            return false;
        }

        true
    }

    /// Apply the filter, preserving input order
    pub fn apply(&self, records: Vec<ContentRecord>) -> Vec<ContentRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ContentRecord> {
        vec![
            ContentRecord::new("1", Category::Health, Difficulty::Easy, "Morning walk")
                .with_tags(["walking", "morning"]),
            ContentRecord::new("2", Category::Wealth, Difficulty::Moderate, "Index funds")
                .with_tags(["investing"]),
            ContentRecord::new("3", Category::Health, Difficulty::Advanced, "Fasting")
                .with_description("Time-restricted eating for the morning person")
                .with_tags(["diet"]),
        ]
    }

    fn ids(records: &[ContentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let result = TipFilter::new().apply(records());
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn criteria_combine_conjunctively() {
        let result = TipFilter::new()
            .with_category(Category::Health)
            .with_search("MORNING")
            .apply(records());
        assert_eq!(ids(&result), vec!["1", "3"]);

        let result = TipFilter::new()
            .with_category(Category::Health)
            .with_difficulty(Difficulty::Easy)
            .with_search("morning")
            .apply(records());
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn tags_match_any_shared_tag() {
        let result = TipFilter::new()
            .with_tags(["diet", "investing"])
            .apply(records());
        assert_eq!(ids(&result), vec!["2", "3"]);
    }

    #[test]
    fn malformed_category_matches_nothing() {
        let filter = TipFilter::new().with_category_str("fitness");
        assert_eq!(filter.category, Some(Criterion::Invalid("fitness".into())));
        assert!(filter.apply(records()).is_empty());
    }

    #[test]
    fn parsed_difficulty_is_case_insensitive() {
        let result = TipFilter::new()
            .with_difficulty_str("advanced")
            .apply(records());
        assert_eq!(ids(&result), vec!["3"]);
    }

    #[test]
    fn empty_search_term_is_no_criterion() {
        let filter = TipFilter::new().with_search("");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(records()).len(), 3);
    }
}
