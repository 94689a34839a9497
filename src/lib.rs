//! Vidtwin - chat with the person in your videos
//!
//! Answers messages in the voice of whoever recorded a corpus of analyzed
//! videos. Each message retrieves the most relevant video records, pulls the
//! personality and knowledge insights out of them, and hands a persona prompt
//! built from both to a generative model.
//!
//! # Architecture
//!
//! - `record` - Canonical video records and normalization of stored shapes
//! - `corpus` - Corpus backends (directory scan, external index) and ranking
//! - `insight` - Classification of insights into personality and knowledge
//! - `rag` - Context assembly and replies
//! - `model` - Generative model clients
//! - `orchestrator` - Request coordination
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use vidtwin::config::Settings;
//! use vidtwin::orchestrator::{ChatOrchestrator, ChatRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = ChatOrchestrator::new(&settings)?;
//!
//!     let reply = orchestrator.respond(&ChatRequest::new("What are you building?")).await?;
//!     println!("{}", reply.format_for_display());
//!
//!     orchestrator.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod insight;
pub mod model;
pub mod orchestrator;
pub mod rag;
pub mod record;

pub use error::{Result, VidtwinError};
