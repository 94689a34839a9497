//! Google Gemini `generateContent` client.

use super::{ConversationTurn, GenerationRequest, LanguageModel, Role};
use crate::config::ModelSettings;
use crate::error::{Result, VidtwinError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini model client.
pub struct GeminiModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(model: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VidtwinError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            VidtwinError::Config("GEMINI_API_KEY is not set and model.api_key is empty".to_string())
        })?;
        let mut model = Self::new(&settings.model, &api_key)?;
        if let Some(base_url) = &settings.base_url {
            model = model.with_base_url(base_url);
        }
        Ok(model)
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn contents(turns: &[ConversationTurn]) -> Vec<Content<'_>> {
        turns
            .iter()
            .map(|turn| Content {
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                },
                parts: vec![Part {
                    text: &turn.content,
                }],
            })
            .collect()
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    #[instrument(skip(self, request), fields(model = %self.model, turns = request.turns.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GenerateContentRequest {
            contents: Self::contents(&request.turns),
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            generation_config: GeminiGenerationConfig {
                temperature: request.config.temperature,
                top_k: request.config.top_k,
                top_p: request.config.top_p,
                max_output_tokens: request.config.max_output_tokens,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VidtwinError::ModelCall(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(500).collect();
            return Err(VidtwinError::ModelCall(format!(
                "Gemini API error (HTTP {}): {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| VidtwinError::ModelCall(format!("Invalid Gemini response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(VidtwinError::ModelCall("Empty response from Gemini".to_string()));
        }

        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
