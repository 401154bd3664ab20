//! Prompt construction

use crate::tip::{ContentRecord, EnhancedContent, UnknownVariant};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Key template shown to the service. Keys must match `EnhancedContent`.
const RESPONSE_TEMPLATE: &str = r#"{
  "expandedDescription": "A detailed 3-4 paragraph description expanding on the original",
  "detailedBenefits": ["5-7 specific, measurable benefits with explanations"],
  "implementationSteps": ["5-10 clear, actionable steps to implement this tip"],
  "proTips": ["3-5 advanced tips for maximum effectiveness"],
  "commonMistakes": ["3-5 common mistakes to avoid"],
  "successMetrics": ["3-5 ways to measure success"],
  "relatedTips": ["3-5 related tip ideas in the same category"],
  "visualDescription": "Detailed description for visual design (colors, imagery, mood)",
  "socialMediaPosts": {
    "twitter": "Engaging tweet (max 280 chars) with hashtags",
    "instagram": "Instagram caption with emojis and hashtags",
    "linkedin": "Professional LinkedIn post"
  },
  "emailContent": "2-3 paragraph email content promoting this tip",
  "landingPageCopy": "Compelling landing page copy with headline and 3 sections"
}"#;

/// Build the enhancement prompt for one tip
pub fn enhancement_prompt(record: &ContentRecord) -> String {
    let content = &record.content;
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are an expert content creator and marketing strategist. \
         Enhance the following tip into complete content for several output formats.\n\n",
    );
    prompt.push_str("Original Tip:\n");
    // Writing to a String cannot fail
    let _ = writeln!(prompt, "Title: {}", content.title);
    let _ = writeln!(prompt, "Subtitle: {}", content.subtitle);
    let _ = writeln!(prompt, "Category: {}", record.category);
    if let Some(subcategory) = &record.subcategory {
        let _ = writeln!(prompt, "Subcategory: {}", subcategory);
    }
    let _ = writeln!(prompt, "Difficulty: {}", record.difficulty);
    let _ = writeln!(prompt, "Description: {}", content.description);
    let _ = writeln!(prompt, "Primary Benefit: {}", content.benefits.primary);
    let _ = writeln!(prompt, "Secondary Benefit: {}", content.benefits.secondary);
    let _ = writeln!(prompt, "Tertiary Benefit: {}", content.benefits.tertiary);
    if let Some(implementation) = &record.implementation {
        let _ = writeln!(
            prompt,
            "Implementation: {} | {} | {}",
            implementation.time, implementation.frequency, implementation.cost
        );
    }
    if !record.tags.is_empty() {
        let _ = writeln!(prompt, "Tags: {}", record.tags.join(", "));
    }

    prompt.push_str("\nRespond with a single JSON object in exactly this shape:\n");
    prompt.push_str(RESPONSE_TEMPLATE);
    let _ = write!(
        prompt,
        "\n\nMake the content actionable, engaging, and valuable. Focus on the {} category.",
        record.category
    );
    prompt
}

/// Output surface for [`platform_prompt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Pdf,
    Canva,
    Web,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Pdf, Platform::Canva, Platform::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Pdf => "pdf",
            Platform::Canva => "canva",
            Platform::Web => "web",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Platform::Pdf => {
                "Optimize this content for a professional PDF document with clear sections and visual hierarchy"
            }
            Platform::Canva => {
                "Optimize this content for visual design with short, impactful text and clear visual elements"
            }
            Platform::Web => {
                "Optimize this content for web with SEO-friendly structure, headings, and engaging copy"
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            })
    }
}

/// Build the prompt that reworks enhanced content for one platform
pub fn platform_prompt(content: &EnhancedContent, platform: Platform) -> String {
    let body = serde_json::to_string_pretty(content).unwrap_or_default();
    format!(
        "{}\n\nContent to optimize:\n{}\n\nProvide optimized content in JSON format with platform-specific formatting.",
        platform.instruction(),
        body
    )
}
