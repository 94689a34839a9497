//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod insights;
mod list;
mod search;
mod serve;
mod topics;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use insights::run_insights;
pub use list::run_list;
pub use search::run_search;
pub use serve::{router, run_serve};
pub use topics::run_topics;
