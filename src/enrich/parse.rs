//! Decoding generated text
//!
//! Model output is often JSON wrapped in prose or a markdown fence.
//! Decoding never fails: anything that does not yield the expected
//! shape is replaced by default content and flagged as degraded.

use crate::tip::EnhancedContent;
use serde_json::Value;

/// Extract a JSON object from generated text.
///
/// Tries, in order:
/// 1. The whole text
/// 2. A ```json (or bare ```) fenced block
/// 3. The span from the first `{` to the last `}`
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Some(v) = parse_object(trimmed) {
        return Some(v);
    }

    let fenced = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        after.find("```").map(|end| &after[..end])
    } else if let Some(start) = trimmed.find("```\n") {
        let after = &trimmed[start + 4..];
        after.find("```").map(|end| &after[..end])
    } else {
        None
    };
    if let Some(v) = fenced.and_then(|block| parse_object(block.trim())) {
        return Some(v);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => parse_object(&trimmed[start..=end]),
        _ => None,
    }
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text).ok().filter(Value::is_object)
}

/// Decode an enhancement response.
///
/// Returns the content and whether it was degraded to the placeholder.
/// A response missing any field counts as unparseable.
pub fn parse_enhanced_content(text: &str) -> (EnhancedContent, bool) {
    extract_json(text)
        .and_then(|v| serde_json::from_value::<EnhancedContent>(v).ok())
        .map_or_else(|| (EnhancedContent::placeholder(), true), |c| (c, false))
}

/// Decode a platform-optimisation response.
///
/// Any JSON object is accepted as-is. Otherwise the placeholder content
/// stands in and the result is degraded.
pub fn parse_platform_output(text: &str) -> (Value, bool) {
    match extract_json(text) {
        Some(v) => (v, false),
        None => (
            serde_json::to_value(EnhancedContent::placeholder()).unwrap_or(Value::Null),
            true,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_json() -> String {
        let mut content = EnhancedContent::placeholder();
        content.expanded_description = "Real output".into();
        serde_json::to_string(&content).unwrap()
    }

    #[test]
    fn direct_json() {
        let (content, degraded) = parse_enhanced_content(&full_json());
        assert!(!degraded);
        assert_eq!(content.expanded_description, "Real output");
    }

    #[test]
    fn fenced_json() {
        let text = format!("Here you go:\n```json\n{}\n```\nEnjoy!", full_json());
        let (content, degraded) = parse_enhanced_content(&text);
        assert!(!degraded);
        assert_eq!(content.expanded_description, "Real output");
    }

    #[test]
    fn json_embedded_in_prose() {
        let text = format!("Sure! {} Let me know if you need more.", full_json());
        assert!(!parse_enhanced_content(&text).1);
    }

    #[test]
    fn non_json_degrades_to_placeholder() {
        let (content, degraded) = parse_enhanced_content("I cannot help with that.");
        assert!(degraded);
        assert_eq!(content, EnhancedContent::placeholder());
    }

    #[test]
    fn partial_object_degrades() {
        let (_, degraded) = parse_enhanced_content(r#"{"expandedDescription": "only this"}"#);
        assert!(degraded);
    }

    #[test]
    fn arrays_are_not_objects() {
        assert!(extract_json("[1, 2, 3]").is_none());
        assert!(extract_json("").is_none());
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn platform_output_accepts_any_object() {
        let (body, degraded) = parse_platform_output(r#"{"sections": ["Intro", "Steps"]}"#);
        assert!(!degraded);
        assert_eq!(body["sections"][1], "Steps");

        let (body, degraded) = parse_platform_output("no json here");
        assert!(degraded);
        assert!(body.get("landingPageCopy").is_some());
    }
}
