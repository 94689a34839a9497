//! Directory-scan corpus backend.
//!
//! Reads and scores every record on each query, which is O(records × terms).
//! That is fine for a personal dataset of a few hundred videos; larger corpora
//! should use the index backend.

use super::{rank, CorpusSource, ScoredRecord};
use crate::error::{Result, VidtwinError};
use crate::record::{normalize, VideoRecord};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Corpus backed by a directory of `<key>.json` dataset files.
pub struct ScanSource {
    dir: PathBuf,
}

impl ScanSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Dataset files, sorted by file name. The sort fixes the enumeration
    /// order that ranking ties fall back to.
    async fn record_paths(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            VidtwinError::RetrievalUnavailable(format!(
                "Cannot read dataset directory {:?}: {}",
                self.dir, e
            ))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Load and normalize every record, skipping malformed files and
    /// records whose id was already seen earlier in file-name order.
    async fn load_all(&self) -> Result<Vec<VideoRecord>> {
        let paths = self.record_paths().await?;
        let loaded = join_all(paths.iter().map(|p| load_record(p))).await;

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(loaded.len());
        for result in loaded {
            match result {
                Ok(record) if !seen.insert(record.id.clone()) => {
                    warn!(
                        "Skipping record '{}': duplicate id '{}'",
                        record.filename, record.id
                    );
                }
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping record: {}", e),
            }
        }

        debug!("Loaded {} of {} records from {:?}", records.len(), paths.len(), self.dir);
        Ok(records)
    }
}

/// Storage key of a dataset file: its name without the `.json` suffix.
fn record_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn load_record(path: &Path) -> Result<VideoRecord> {
    let key = record_key(path);
    let bytes = tokio::fs::read(path).await.map_err(|e| VidtwinError::RecordMalformed {
        key: key.clone(),
        reason: e.to_string(),
    })?;
    parse_record(&key, &bytes)
}

/// Parse one dataset file. Only the top-level shape is checked here; every
/// nested field is optional.
pub(crate) fn parse_record(key: &str, bytes: &[u8]) -> Result<VideoRecord> {
    let raw: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| VidtwinError::RecordMalformed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    if !raw.is_object() {
        return Err(VidtwinError::RecordMalformed {
            key: key.to_string(),
            reason: "top-level value is not an object".to_string(),
        });
    }

    Ok(normalize(&raw, key))
}

#[async_trait]
impl CorpusSource for ScanSource {
    fn name(&self) -> &'static str {
        "scan"
    }

    #[instrument(skip(self), fields(dir = ?self.dir))]
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredRecord>> {
        let records = self.load_all().await?;
        Ok(rank::rank(records, query, limit))
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        self.load_all().await
    }

    async fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        Ok(self.load_all().await?.into_iter().find(|r| r.id == id))
    }
}
