//! Retrieval-augmented persona responses.
//!
//! Turns ranked sources into the context handed to the model, and shapes the
//! model's answer into a reply with its sources.

pub mod context;
mod response;

pub use context::{conversation_turns, window_history, ContextAssembler, ContextBlock};
pub use response::{ChatReply, SourceRef, VideoInsights};
