//! CLI module for Vidtwin.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vidtwin - chat with the person in your videos
///
/// Answers questions in the voice of whoever recorded a corpus of analyzed
/// videos, grounded in their transcripts and inferred insights.
#[derive(Parser, Debug)]
#[command(name = "vidtwin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Corpus backend override (scan, index)
    #[arg(long, global = true, env = "VIDTWIN_BACKEND")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question
    Ask {
        /// The message to send
        message: String,
    },

    /// Show which videos a query would draw on
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Start an interactive chat session
    Chat,

    /// List videos in the corpus
    List,

    /// List topics and tags, most frequent first
    Topics {
        /// Maximum number of topics to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a question about one video
    Insights {
        /// Video ID
        video_id: String,

        /// Question (defaults to a general overview)
        question: Option<String>,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the current configuration to the config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["vidtwin", "-vv", "search", "rust", "--limit", "3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { query, limit } => {
                assert_eq!(query, "rust");
                assert_eq!(limit, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_insights_optional_question() {
        let cli = Cli::parse_from(["vidtwin", "insights", "2024-01-01"]);
        match cli.command {
            Commands::Insights { video_id, question } => {
                assert_eq!(video_id, "2024-01-01");
                assert!(question.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
