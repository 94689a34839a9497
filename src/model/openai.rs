//! OpenAI chat completions client.

use super::{GenerationRequest, LanguageModel, Role};
use crate::config::ModelSettings;
use crate::error::{Result, VidtwinError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-backed model.
///
/// Chat completions have no top-k parameter, so `GenerationConfig::top_k` is ignored.
pub struct OpenAIModel {
    client: Client<OpenAIConfig>,
    model: String,
}

/// Create an OpenAI client with a request timeout.
fn create_client(
    api_key: Option<&str>,
    base_url: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidtwinError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = base_url {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

impl OpenAIModel {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key();
        Ok(Self {
            client: create_client(
                api_key.as_deref(),
                settings.base_url.as_deref(),
                settings.timeout(),
            )?,
            model: settings.model.clone(),
        })
    }

    fn messages(request: &GenerationRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system_instruction.clone())
                .build()
                .map_err(|e| VidtwinError::ModelCall(e.to_string()))?
                .into(),
        ];

        for turn in &request.turns {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| VidtwinError::ModelCall(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| VidtwinError::ModelCall(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        Ok(messages)
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    #[instrument(skip(self, request), fields(model = %self.model, turns = request.turns.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(request)?)
            .temperature(request.config.temperature)
            .top_p(request.config.top_p)
            .max_completion_tokens(request.config.max_output_tokens)
            .build()
            .map_err(|e| VidtwinError::ModelCall(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            VidtwinError::ModelCall(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| VidtwinError::ModelCall("Empty response from LLM".to_string()))?
            .clone();

        debug!("OpenAI returned {} chars", answer.len());
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
