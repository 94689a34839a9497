//! Generative model clients.
//!
//! The rest of the crate treats the model as an opaque function: a system
//! instruction, an ordered list of turns and sampling parameters in, text out.

mod gemini;
mod openai;

pub use gemini::GeminiModel;
pub use openai::OpenAIModel;

use crate::config::{ModelProvider, ModelSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// Anything other than `user` is treated as the assistant side.
    #[serde(other)]
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&ModelSettings> for GenerationConfig {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_k: settings.top_k,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

/// Everything a model call needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    /// Ordered oldest first; the newest user turn is last.
    pub turns: Vec<ConversationTurn>,
    pub config: GenerationConfig,
}

/// Trait for generative model backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a reply. Any failure is reported as `ModelCall`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Model identifier for logs.
    fn model_name(&self) -> &str;
}

/// Create the model client selected by configuration.
pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn LanguageModel>> {
    let model: Arc<dyn LanguageModel> = match settings.provider {
        ModelProvider::Gemini => Arc::new(GeminiModel::from_settings(settings)?),
        ModelProvider::OpenAI => Arc::new(OpenAIModel::from_settings(settings)?),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_deserialization() {
        let turns: Vec<ConversationTurn> = serde_json::from_str(
            r#"[{"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "model", "content": "hey"}]"#,
        )
        .unwrap();

        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::Assistant);
    }

    #[test]
    fn test_generation_config_from_settings() {
        let config = GenerationConfig::from(&ModelSettings::default());
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 1000);
    }
}
