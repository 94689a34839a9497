//! Topics command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::{create_source, topic_catalogue};
use anyhow::Result;

/// Run the topics command.
pub async fn run_topics(limit: Option<usize>, settings: &Settings) -> Result<()> {
    let corpus = create_source(settings)?;
    let records = corpus.list().await;
    corpus.close().await;

    let topics = topic_catalogue(&records?);
    if topics.is_empty() {
        Output::info("No topics found.");
        return Ok(());
    }

    Output::header(&format!("Topics ({})", topics.len()));
    for topic in topics.iter().take(limit.unwrap_or(usize::MAX)) {
        Output::list_item(topic);
    }

    Ok(())
}
