//! Design briefs: tip data shaped for visual template tools

use crate::tip::{Category, ContentRecord, Difficulty, Implementation, TipId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub gradient: &'static str,
}

/// Brand colours for a category
pub fn category_palette(category: Category) -> Palette {
    match category {
        Category::Health => Palette {
            primary: "#22c55e",
            secondary: "#86efac",
            accent: "#15803d",
            gradient: "linear-gradient(135deg, #22c55e 0%, #15803d 100%)",
        },
        Category::Wealth => Palette {
            primary: "#eab308",
            secondary: "#fde047",
            accent: "#a16207",
            gradient: "linear-gradient(135deg, #eab308 0%, #f59e0b 100%)",
        },
        Category::Happiness => Palette {
            primary: "#a855f7",
            secondary: "#d8b4fe",
            accent: "#7c3aed",
            gradient: "linear-gradient(135deg, #a855f7 0%, #7c3aed 100%)",
        },
    }
}

/// Template key, e.g. `template_health_easy`
pub fn template_key(category: Category, difficulty: Difficulty) -> String {
    format!(
        "template_{}_{}",
        category.as_str(),
        difficulty.as_str().to_ascii_lowercase()
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignBrief {
    pub id: TipId,
    pub title: String,
    pub subtitle: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub description: String,
    /// Primary, secondary, tertiary
    pub benefits: [String; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Implementation>,
    pub whats_included: Vec<String>,
    pub tags: Vec<String>,
    pub colors: Palette,
    pub template: String,
}

impl DesignBrief {
    pub fn from_record(record: &ContentRecord) -> Self {
        let benefits = &record.content.benefits;
        Self {
            id: record.id.clone(),
            title: record.content.title.clone(),
            subtitle: record.content.subtitle.clone(),
            category: record.category,
            difficulty: record.difficulty,
            description: record.content.description.clone(),
            benefits: [
                benefits.primary.clone(),
                benefits.secondary.clone(),
                benefits.tertiary.clone(),
            ],
            implementation: record.implementation.clone(),
            whats_included: record.content.whats_included.clone(),
            tags: record.tags.clone(),
            colors: category_palette(record.category),
            template: template_key(record.category, record.difficulty),
        }
    }
}

/// Briefs for `records`, restricted to `ids` unless `ids` is empty
pub fn export_for_design(records: &[ContentRecord], ids: &[TipId]) -> Vec<DesignBrief> {
    records
        .iter()
        .filter(|r| ids.is_empty() || ids.contains(&r.id))
        .map(DesignBrief::from_record)
        .collect()
}
