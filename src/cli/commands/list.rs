//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::create_source;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: &Settings) -> Result<()> {
    let corpus = create_source(settings)?;
    let result = corpus.list().await;
    corpus.close().await;

    match result {
        Ok(records) if records.is_empty() => {
            Output::info("No videos found in the corpus.");
        }
        Ok(records) => {
            Output::header(&format!("Videos ({})", records.len()));
            println!();
            for record in &records {
                Output::video_info(&record.id, &record.video_file, &record.topics);
            }
            let insights: usize = records.iter().map(|r| r.insights.len()).sum();
            println!();
            Output::kv("Total videos", &records.len().to_string());
            Output::kv("Total insights", &insights.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
