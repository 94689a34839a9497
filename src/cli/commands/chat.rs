//! Interactive chat command.

use crate::cli::Output;
use crate::config::Settings;
use crate::model::ConversationTurn;
use crate::orchestrator::{ChatOrchestrator, ChatRequest};
use crate::rag::window_history;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(settings: &Settings) -> Result<()> {
    let orchestrator = ChatOrchestrator::new(settings)?;
    let window = settings.context.history_window;
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!("\n{}", style("Vidtwin Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type a message, or 'exit' to quit. Use 'clear' to reset the conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            history.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let request = ChatRequest::new(input).with_history(history.clone());
        match orchestrator.respond(&request).await {
            Ok(reply) => {
                println!("\n{} {}\n", style("Twin:").cyan().bold(), reply.response);
                if !reply.sources.is_empty() {
                    let ids: Vec<&str> = reply.sources.iter().map(|s| s.id.as_str()).collect();
                    println!("{}\n", style(format!("sources: {}", ids.join(", "))).dim());
                }
                history.push(ConversationTurn::user(input));
                history.push(ConversationTurn::assistant(reply.response));
                history = window_history(&history, window);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e.user_message()));
            }
        }
    }

    orchestrator.shutdown().await;
    Ok(())
}
