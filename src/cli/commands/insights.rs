//! Single-video insights command.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::ChatOrchestrator;
use anyhow::Result;

/// Run the insights command.
pub async fn run_insights(video_id: &str, question: Option<&str>, settings: &Settings) -> Result<()> {
    let orchestrator = ChatOrchestrator::new(settings)?;

    let spinner = Output::spinner("Analyzing video...");
    let result = orchestrator.video_insights(video_id, question).await;
    spinner.finish_and_clear();
    orchestrator.shutdown().await;

    let insights = match result {
        Ok(insights) => insights,
        Err(e) => {
            Output::error(&format!("Failed to analyze video: {}", e));
            return Err(e.into());
        }
    };

    println!("\n{}\n", insights.insights);
    if !insights.topics.is_empty() {
        Output::kv("Topics", &insights.topics.join(", "));
    }
    if !insights.tags.is_empty() {
        Output::kv("Tags", &insights.tags.join(", "));
    }

    Ok(())
}
