//! Keyword-frequency ranking used by the scan backend.
//!
//! Scoring is deliberately loose: terms are matched as substrings, so a short
//! term also counts inside longer words ("go" matches "good"). Switching to
//! whole-word matching changes the ranking and its tests.

use super::{Score, ScoredRecord};
use crate::record::VideoRecord;

/// Split a query into lower-cased terms. Repeated terms are kept.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// The text a record is matched against, lower-cased.
pub fn searchable_text(record: &VideoRecord) -> String {
    format!(
        "{} {} {}",
        record.transcript,
        record.summary,
        record.topics.join(" ")
    )
    .to_lowercase()
}

/// Sum of non-overlapping substring occurrences of every term in `text`.
pub fn score_text(text: &str, terms: &[String]) -> u32 {
    terms
        .iter()
        .map(|term| text.matches(term.as_str()).count() as u32)
        .sum()
}

/// Score `records` against `query` and keep the best `limit`.
///
/// Sorting is stable: equal scores keep the input order.
pub fn rank(records: Vec<VideoRecord>, query: &str, limit: usize) -> Vec<ScoredRecord> {
    let terms = query_terms(query);

    let mut scored: Vec<(u32, VideoRecord)> = records
        .into_iter()
        .map(|record| (score_text(&searchable_text(&record), &terms), record))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, record)| ScoredRecord {
            record,
            score: Score::Matches(score),
        })
        .collect()
}
