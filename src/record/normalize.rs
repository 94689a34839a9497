//! Conversion of stored records into [`VideoRecord`]s.
//!
//! Two physical shapes exist. Dataset files are nested:
//!
//! ```json
//! { "id": "...", "videoFileName": "...",
//!   "analysis": { "transcript": "...", "summary": "...", "screenContent": "...",
//!                 "topics": ["..."], "tags": ["..."] },
//!   "inferred_insights": [{ "type": "...", "insight": "...", "certainty": "...", "basis": "..." }] }
//! ```
//!
//! Index metadata is flat and string-valued: `topics` and `tags` are joined
//! with [`LIST_DELIMITER`] and `filename` keeps its `.json` suffix. `insights`
//! is either a JSON-encoded insight list or, as the ingestion script writes
//! it, the bare insight texts joined by newlines.
//!
//! Both shapes trim list items and drop empty ones, and insights without text
//! are dropped.

use super::{Insight, VideoRecord};
use serde_json::Value;

/// Delimiter the ingestion step uses to join topic and tag lists.
pub const LIST_DELIMITER: &str = ", ";

/// Placeholder written by the ingestion step for records without insights.
const NO_INSIGHTS: &str = "No insights available";

/// Normalize a nested dataset record. Never fails; missing fields become empty.
///
/// `fallback_id` is the record's storage key. It doubles as the filename and
/// as the id when the record carries no explicit `id`.
pub fn normalize(raw: &Value, fallback_id: &str) -> VideoRecord {
    let analysis = raw.get("analysis");
    let field = |key: &str| analysis.map(|a| text_field(a, key)).unwrap_or_default();
    let list = |key: &str| analysis.map(|a| string_list(a.get(key))).unwrap_or_default();

    VideoRecord {
        id: non_empty(text_field(raw, "id")).unwrap_or_else(|| fallback_id.to_string()),
        filename: fallback_id.to_string(),
        video_file: non_empty(text_field(raw, "videoFileName"))
            .unwrap_or_else(|| format!("{}.mp4", fallback_id)),
        transcript: field("transcript"),
        summary: field("summary"),
        screen_content: field("screenContent"),
        topics: list("topics"),
        tags: list("tags"),
        insights: insight_list(raw.get("inferred_insights")),
    }
}

/// Normalize an index hit from its id and flattened metadata.
pub fn normalize_index_metadata(id: &str, metadata: &Value) -> VideoRecord {
    let filename = non_empty(text_field(metadata, "filename"))
        .map(|f| f.strip_suffix(".json").map(str::to_string).unwrap_or(f))
        .unwrap_or_else(|| id.to_string());

    VideoRecord {
        id: id.to_string(),
        video_file: non_empty(text_field(metadata, "videoFileName"))
            .unwrap_or_else(|| format!("{}.mp4", filename)),
        filename,
        transcript: text_field(metadata, "transcript"),
        summary: text_field(metadata, "summary"),
        screen_content: text_field(metadata, "screenContent"),
        topics: split_joined(&text_field(metadata, "topics")),
        tags: split_joined(&text_field(metadata, "tags")),
        insights: decode_insights(&text_field(metadata, "insights")),
    }
}

/// Split a delimiter-joined list back into its items.
pub fn split_joined(joined: &str) -> Vec<String> {
    if joined.trim().is_empty() {
        return Vec::new();
    }
    joined
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode the `insights` metadata string.
///
/// JSON-encoded lists round-trip exactly. Newline-joined texts carry no
/// insight type, so they come back untyped and the classifier ignores them.
fn decode_insights(encoded: &str) -> Vec<Insight> {
    let trimmed = encoded.trim();
    if trimmed.is_empty() || trimmed == NO_INSIGHTS {
        return Vec::new();
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_array() {
            return insight_list(Some(&value));
        }
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Insight::new("", line))
        .collect()
}

fn insight_list(value: Option<&Value>) -> Vec<Insight> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| Insight {
            kind: text_field(item, "type"),
            insight: text_field(item, "insight").trim().to_string(),
            certainty: text_field(item, "certainty"),
            basis: text_field(item, "basis"),
        })
        .filter(|insight| !insight.insight.is_empty())
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Read a scalar field as text. Numbers and booleans are stringified.
fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_fixture() -> Value {
        json!({
            "videoFileName": "2024-05-01_12-00-00.mp4",
            "analysis": {
                "transcript": "Today I deployed the site.",
                "summary": "Deploying a website.",
                "screenContent": "A terminal window",
                "topics": ["deployment", "web hosting"],
                "tags": ["devops", "vlog"]
            },
            "inferred_insights": [
                {"type": "skill", "insight": "Can deploy websites", "certainty": "high", "basis": "Shown on screen"},
                {"type": "mood", "insight": "Seems tired", "certainty": "low", "basis": "Voice"}
            ]
        })
    }

    /// Flatten a record the way the ingestion step writes index metadata.
    fn flatten(raw: &Value, key: &str) -> Value {
        let analysis = &raw["analysis"];
        let join = |k: &str| {
            analysis[k]
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(LIST_DELIMITER)
                })
                .unwrap_or_default()
        };
        json!({
            "filename": format!("{}.json", key),
            "videoFileName": raw["videoFileName"],
            "topics": join("topics"),
            "tags": join("tags"),
            "summary": analysis["summary"],
            "transcript": analysis["transcript"],
            "screenContent": analysis["screenContent"],
            "insights": raw["inferred_insights"].to_string(),
        })
    }

    #[test]
    fn test_normalize_nested() {
        let record = normalize(&nested_fixture(), "2024-05-01_12-00-00");

        assert_eq!(record.id, "2024-05-01_12-00-00");
        assert_eq!(record.filename, "2024-05-01_12-00-00");
        assert_eq!(record.transcript, "Today I deployed the site.");
        assert_eq!(record.topics, vec!["deployment", "web hosting"]);
        assert_eq!(record.tags, vec!["devops", "vlog"]);
        assert_eq!(record.insights.len(), 2);
        assert_eq!(record.insights[1].kind, "mood");
    }

    #[test]
    fn test_explicit_id_wins_over_fallback() {
        let raw = json!({"id": "abc123", "analysis": {}});
        let record = normalize(&raw, "file-key");
        assert_eq!(record.id, "abc123");
        assert_eq!(record.filename, "file-key");
        assert_eq!(record.video_file, "file-key.mp4");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        for raw in [
            json!({}),
            json!({"analysis": null, "inferred_insights": "not a list"}),
            json!({"analysis": {"topics": "deployment", "tags": 7}}),
            json!([1, 2, 3]),
        ] {
            let record = normalize(&raw, "k");
            assert_eq!(record, VideoRecord::empty("k", "k"), "raw: {}", raw);
        }
    }

    #[test]
    fn test_non_string_list_items_dropped() {
        let raw = json!({
            "analysis": {"topics": ["rust", 3, null, "cli"]},
            "inferred_insights": [42, {"type": "goal", "insight": "Ship v1"}]
        });
        let record = normalize(&raw, "k");
        assert_eq!(record.topics, vec!["rust", "cli"]);
        assert_eq!(record.insights, vec![Insight::new("goal", "Ship v1")]);
    }

    #[test]
    fn test_nested_and_flattened_forms_agree() {
        let raw = nested_fixture();
        let key = "2024-05-01_12-00-00";

        let from_file = normalize(&raw, key);
        let from_index = normalize_index_metadata(key, &flatten(&raw, key));

        assert_eq!(from_file, from_index);
    }

    #[test]
    fn test_newline_joined_insights_are_untyped() {
        let meta = json!({"insights": "Likes Rust\nPlays guitar\n"});
        let record = normalize_index_metadata("v1", &meta);
        assert_eq!(record.insights.len(), 2);
        assert_eq!(record.insights[0].insight, "Likes Rust");
        assert!(record.insights.iter().all(|i| i.kind.is_empty()));

        let classified = crate::insight::classify(&record.insights);
        assert!(classified.personality.is_empty());
        assert!(classified.knowledge.is_empty());

        let meta = json!({"insights": "No insights available"});
        assert!(normalize_index_metadata("v1", &meta).insights.is_empty());
    }

    #[test]
    fn test_insights_without_text_dropped() {
        let raw = json!({
            "inferred_insights": [
                {"type": "opinion"},
                {"type": "skill", "insight": "   "},
                {"type": "skill", "insight": 12},
                {"type": "goal", "insight": " Ship v1 "}
            ]
        });
        let record = normalize(&raw, "k");
        assert_eq!(record.insights.len(), 2);
        assert_eq!(record.insights[0].insight, "12");
        assert_eq!(record.insights[1], Insight::new("goal", "Ship v1"));
    }

    #[test]
    fn test_list_items_trimmed_in_both_shapes() {
        let raw = json!({"analysis": {"topics": [" rust ", "", "cli"], "tags": ["  "]}});
        let nested = normalize(&raw, "k");
        assert_eq!(nested.topics, vec!["rust", "cli"]);
        assert!(nested.tags.is_empty());

        let flat = normalize_index_metadata("k", &json!({"topics": " rust , , cli", "tags": "  "}));
        assert_eq!(flat.topics, nested.topics);
        assert_eq!(flat.tags, nested.tags);
    }

    #[test]
    fn test_metadata_without_filename_uses_id() {
        let record = normalize_index_metadata("v9", &json!({}));
        assert_eq!(record, VideoRecord::empty("v9", "v9"));
    }

    #[test]
    fn test_split_joined() {
        assert_eq!(split_joined("a, b,  c"), vec!["a", "b", "c"]);
        assert!(split_joined("   ").is_empty());
    }
}
