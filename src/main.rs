//! Vidtwin CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidtwin::cli::{commands, Cli, Commands};
use vidtwin::config::{CorpusBackend, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    if let Some(backend) = &cli.backend {
        settings.corpus.backend = backend
            .parse::<CorpusBackend>()
            .map_err(|e| anyhow::anyhow!(e))?;
        settings.validate()?;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidtwin={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Ask { message } => {
            commands::run_ask(message, &settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, &settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(&settings).await?;
        }

        Commands::List => {
            commands::run_list(&settings).await?;
        }

        Commands::Topics { limit } => {
            commands::run_topics(*limit, &settings).await?;
        }

        Commands::Insights { video_id, question } => {
            commands::run_insights(video_id, question.as_deref(), &settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.as_deref(), *port, &settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), &settings)?;
        }
    }

    Ok(())
}
