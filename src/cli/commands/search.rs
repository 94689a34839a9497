//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::create_source;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: &Settings) -> Result<()> {
    let corpus = create_source(settings)?;

    let spinner = Output::spinner("Searching...");
    let results = corpus.retrieve(query, limit).await;
    spinner.finish_and_clear();
    corpus.close().await;

    match results {
        Ok(sources) if sources.is_empty() => {
            Output::warning("The corpus is empty.");
        }
        Ok(sources) => {
            Output::success(&format!(
                "Top {} of the {} corpus",
                sources.len(),
                corpus.name()
            ));
            for (i, source) in sources.iter().enumerate() {
                Output::source_result(
                    i + 1,
                    &source.record.id,
                    source.score.value(),
                    &source.record.summary,
                );
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
