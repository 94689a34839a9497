//! Canonical video records and their insights.
//!
//! Both corpus backends produce [`VideoRecord`]s through the normalizers in
//! this module, so everything downstream of retrieval sees one shape.

mod normalize;

pub use normalize::{normalize, normalize_index_metadata, split_joined, LIST_DELIMITER};

use serde::{Deserialize, Serialize};

/// One analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique within a corpus snapshot.
    pub id: String,
    /// Storage key of the record (file stem).
    pub filename: String,
    /// Name of the video file the record was derived from.
    pub video_file: String,
    pub transcript: String,
    pub summary: String,
    /// Text visible on screen, as described by the analysis step.
    pub screen_content: String,
    pub topics: Vec<String>,
    pub tags: Vec<String>,
    pub insights: Vec<Insight>,
}

impl VideoRecord {
    /// An empty record carrying only its identity.
    pub fn empty(id: &str, filename: &str) -> Self {
        Self {
            id: id.to_string(),
            filename: filename.to_string(),
            video_file: format!("{}.mp4", filename),
            transcript: String::new(),
            summary: String::new(),
            screen_content: String::new(),
            topics: Vec::new(),
            tags: Vec::new(),
            insights: Vec::new(),
        }
    }
}

/// A single inferred fact about the recorded person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Category tag, e.g. `personality` or `skill`. Unknown tags are kept as-is.
    #[serde(rename = "type")]
    pub kind: String,
    pub insight: String,
    pub certainty: String,
    pub basis: String,
}

impl Insight {
    pub fn new(kind: &str, insight: &str) -> Self {
        Self {
            kind: kind.to_string(),
            insight: insight.to_string(),
            certainty: String::new(),
            basis: String::new(),
        }
    }
}
