//! Chat replies as handed to front ends.

use crate::corpus::ScoredRecord;
use serde::{Deserialize, Serialize};

/// A source that contributed to a reply. Position N matches context block N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub summary: String,
    pub score: f64,
}

impl From<&ScoredRecord> for SourceRef {
    fn from(scored: &ScoredRecord) -> Self {
        Self {
            id: scored.record.id.clone(),
            summary: scored.record.summary.clone(),
            score: scored.score.value(),
        }
    }
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated answer.
    pub response: String,
    /// Sources in the order they were given to the model.
    pub sources: Vec<SourceRef>,
}

impl ChatReply {
    /// Format the reply for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.response.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for (i, source) in self.sources.iter().enumerate() {
                output.push_str(&format!("\n[{}] {} (score: {:.2})", i + 1, source.id, source.score));
                if !source.summary.is_empty() {
                    output.push_str(&format!("\n    {}", source.summary));
                }
            }
        }

        output
    }
}

/// Answer to a question about one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInsights {
    pub insights: String,
    pub video_id: String,
    pub topics: Vec<String>,
    pub tags: Vec<String>,
}
