//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{ChatOrchestrator, ChatRequest};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(message: &str, settings: &Settings) -> Result<()> {
    let orchestrator = ChatOrchestrator::new(settings)?;

    let spinner = Output::spinner("Thinking...");
    let result = orchestrator.respond(&ChatRequest::new(message)).await;
    spinner.finish_and_clear();
    orchestrator.shutdown().await;

    match result {
        Ok(reply) => {
            println!("\n{}\n", reply.format_for_display());
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
