//! External similarity-index corpus backend (Chroma REST API).
//!
//! The collection is resolved once, on first use, and the resolved id is
//! reused by every later request. Scoring is entirely the index's job; this
//! module only maps its hits back into records.
//!
//! The ingestion script stores each record's insights as newline-joined texts
//! without their types. Hits from such a collection carry untyped insights, so
//! they add no personality or knowledge lines and the persona falls back to
//! its generic sentences. Collections whose `insights` metadata is a JSON
//! insight list keep the types.

use super::{CorpusSource, Score, ScoredRecord};
use crate::error::{Result, VidtwinError};
use crate::record::{normalize_index_metadata, VideoRecord};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use url::Url;

/// Corpus backed by a collection in an external vector index.
pub struct IndexSource {
    client: reqwest::Client,
    base_url: Url,
    collection: String,
    collection_id: OnceCell<String>,
    closed: AtomicBool,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Value>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    #[serde(default)]
    metadatas: Option<Vec<Option<Value>>>,
}

impl IndexSource {
    /// Create a source for `collection` on the index at `base_url`.
    ///
    /// No connection is made until the first request.
    pub fn new(base_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            VidtwinError::Config(format!("Invalid index URL '{}': {}", base_url, e))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VidtwinError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            collection: collection.to_string(),
            collection_id: OnceCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VidtwinError::Config(format!("Index URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "collections"])
            .extend(segments);
        Ok(url)
    }

    /// Resolve the collection id, connecting on first use.
    async fn collection_id(&self) -> Result<&str> {
        if self.closed.load(Ordering::Acquire) {
            return Err(VidtwinError::RetrievalUnavailable(
                "index connection is closed".to_string(),
            ));
        }

        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = self.endpoint(&[self.collection.as_str()])?;
                let response = self.client.get(url).send().await.map_err(unavailable)?;
                if !response.status().is_success() {
                    return Err(VidtwinError::RetrievalUnavailable(format!(
                        "collection '{}' not found (HTTP {})",
                        self.collection,
                        response.status()
                    )));
                }
                let info: CollectionInfo = response.json().await.map_err(unavailable)?;
                info!("Connected to index collection '{}' ({})", self.collection, info.id);
                Ok::<_, VidtwinError>(info.id)
            })
            .await?;

        Ok(id.as_str())
    }

    async fn post(&self, action: &str, body: Value) -> Result<reqwest::Response> {
        let collection_id = self.collection_id().await?;
        let url = self.endpoint(&[collection_id, action])?;
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            return Err(VidtwinError::RetrievalUnavailable(format!(
                "index {} failed with HTTP {}",
                action,
                response.status()
            )));
        }
        Ok(response)
    }

    async fn fetch(&self, ids: Option<&[&str]>) -> Result<Vec<VideoRecord>> {
        let mut body = json!({ "include": ["metadatas"] });
        if let Some(ids) = ids {
            body["ids"] = json!(ids);
        }

        let response: GetResponse = self
            .post("get", body)
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        let metadatas = response.metadatas.unwrap_or_default();
        Ok(response
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let metadata = metadatas.get(i).cloned().flatten().unwrap_or(Value::Null);
                normalize_index_metadata(id, &metadata)
            })
            .collect())
    }
}

/// Convert an index distance into a non-negative, larger-is-better score.
fn similarity(distance: Option<f32>) -> f32 {
    match distance {
        Some(d) if d.is_finite() => 1.0 / (1.0 + d.max(0.0)),
        _ => 0.0,
    }
}

fn unavailable(e: reqwest::Error) -> VidtwinError {
    VidtwinError::RetrievalUnavailable(e.to_string())
}

#[async_trait]
impl CorpusSource for IndexSource {
    fn name(&self) -> &'static str {
        "index"
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "query_texts": [query],
            "n_results": limit,
            "include": ["metadatas", "documents", "distances"],
        });

        let response: QueryResponse = self
            .post("query", body)
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        // One query text was sent, so only the first result row is relevant.
        let ids = response.ids.into_iter().next().unwrap_or_default();
        let metadatas = response
            .metadatas
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();
        let distances = response
            .distances
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();

        let mut hits: Vec<ScoredRecord> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let metadata = metadatas.get(i).cloned().flatten().unwrap_or(Value::Null);
                ScoredRecord {
                    record: normalize_index_metadata(id, &metadata),
                    score: Score::Similarity(similarity(distances.get(i).copied().flatten())),
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));
        hits.truncate(limit);

        debug!("Index returned {} hits", hits.len());
        Ok(hits)
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        self.fetch(None).await
    }

    async fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        Ok(self
            .fetch(Some(std::slice::from_ref(&id)))
            .await?
            .into_iter()
            .next())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        info!("Closed index connection to '{}'", self.collection);
    }
}
