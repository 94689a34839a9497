//! Corpus sources for retrieval.
//!
//! Provides a trait-based interface over the two corpus backends: a keyword
//! scan over a directory of dataset files and an external similarity index.

mod index;
pub mod rank;
mod scan;

pub use index::IndexSource;
pub use scan::ScanSource;

use crate::config::{CorpusBackend, Settings};
use crate::error::Result;
use crate::record::VideoRecord;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Default number of records returned by a retrieval.
pub const DEFAULT_LIMIT: usize = 5;

/// Relevance of a record to a query.
///
/// The two backends score on unrelated scales, so the variant records which
/// scale a value belongs to and comparisons across variants are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Score {
    /// Number of query-term occurrences found by the scan backend.
    Matches(u32),
    /// Similarity reported by the index backend, derived from its distance.
    Similarity(f32),
}

impl Score {
    /// The raw value, for display and serialization.
    pub fn value(&self) -> f64 {
        match self {
            Score::Matches(n) => f64::from(*n),
            Score::Similarity(s) => f64::from(*s),
        }
    }
}

/// A record paired with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: VideoRecord,
    pub score: Score,
}

/// Trait for corpus backends.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Return at most `limit` records, ordered by score descending.
    ///
    /// An empty corpus or a query with no matches yields an empty list.
    /// An unreachable corpus yields `RetrievalUnavailable`.
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredRecord>>;

    /// All records in enumeration order.
    async fn list(&self) -> Result<Vec<VideoRecord>>;

    /// Look up a single record by id.
    async fn get(&self, id: &str) -> Result<Option<VideoRecord>>;

    /// Release any held connection. Later calls report the corpus as unavailable.
    async fn close(&self) {}
}

/// Retrieve, degrading any failure or timeout to an empty result.
pub async fn retrieve_or_empty(
    source: &dyn CorpusSource,
    query: &str,
    limit: usize,
    timeout: Duration,
) -> Vec<ScoredRecord> {
    match tokio::time::timeout(timeout, source.retrieve(query, limit)).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => {
            warn!("{} retrieval failed, continuing without sources: {}", source.name(), e);
            Vec::new()
        }
        Err(_) => {
            warn!(
                "{} retrieval timed out after {:?}, continuing without sources",
                source.name(),
                timeout
            );
            Vec::new()
        }
    }
}

/// Create the corpus source selected by configuration.
pub fn create_source(settings: &Settings) -> Result<Arc<dyn CorpusSource>> {
    let source: Arc<dyn CorpusSource> = match settings.corpus.backend {
        CorpusBackend::Scan => Arc::new(ScanSource::new(settings.dataset_dir())),
        CorpusBackend::Index => Arc::new(IndexSource::new(
            &settings.corpus.index_url,
            &settings.corpus.collection,
            settings.retrieval_timeout(),
        )?),
    };
    Ok(source)
}

/// Unique topics and tags across records, most frequent first.
///
/// Matching is case-insensitive and results are lower-cased. Equal counts keep
/// the order in which topics were first seen.
pub fn topic_catalogue(records: &[VideoRecord]) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let all = records
        .iter()
        .flat_map(|r| r.topics.iter().chain(r.tags.iter()));

    for topic in all {
        let key = topic.to_lowercase();
        let next = counts.len();
        counts.entry(key).or_insert((0, next)).0 += 1;
    }

    let mut topics: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    topics.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    topics.into_iter().map(|(topic, _)| topic).collect()
}
