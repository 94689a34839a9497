//! Configuration module for Vidtwin.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PersonaPrompts, Prompts};
pub use settings::{
    ContextSettings, CorpusBackend, CorpusSettings, GeneralSettings, ModelProvider,
    ModelSettings, PromptSettings, ServerSettings, Settings,
};
