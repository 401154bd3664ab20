//! Relevance scoring between tips

use super::record::ContentRecord;
use std::collections::HashSet;

/// Points for sharing a category
pub const SAME_CATEGORY: u32 = 3;
/// Points for sharing a difficulty
pub const SAME_DIFFICULTY: u32 = 2;
/// Points per tag present on both tips
pub const PER_SHARED_TAG: u32 = 1;

/// Heuristic similarity between two tips.
///
/// Tags are compared by exact string match and treated as a set, so a
/// tag repeated on one tip still counts once.
pub fn relevance_score(a: &ContentRecord, b: &ContentRecord) -> u32 {
    let mut score = 0;

    if a.category == b.category {
        score += SAME_CATEGORY;
    }
    if a.difficulty == b.difficulty {
        score += SAME_DIFFICULTY;
    }

    let theirs: HashSet<&str> = b.tags.iter().map(String::as_str).collect();
    let shared = a
        .tags
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&theirs)
        .count() as u32;

    score + shared * PER_SHARED_TAG
}
