//! Request orchestration for Vidtwin.
//!
//! Drives one chat message through retrieval, context assembly and the model
//! call. A chat cycle moves `Idle → Retrieving → Assembling → AwaitingModel →
//! Done`; `Failed` is reachable from any state. Retrieval problems never fail
//! the cycle, they only leave it without sources.

use crate::config::{Prompts, Settings};
use crate::corpus::{create_source, retrieve_or_empty, CorpusSource};
use crate::error::{Result, VidtwinError};
use crate::model::{create_model, ConversationTurn, GenerationConfig, GenerationRequest, LanguageModel};
use crate::rag::{conversation_turns, ChatReply, ContextAssembler, SourceRef, VideoInsights};
use crate::record::VideoRecord;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Sampling for single-video questions, which favor factual answers.
const INSIGHTS_TEMPERATURE: f32 = 0.2;
const INSIGHTS_MAX_OUTPUT_TOKENS: u32 = 800;

/// Stage of a chat cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Retrieving,
    Assembling,
    AwaitingModel,
    Done,
    Failed,
}

impl ChatState {
    fn can_advance_to(self, next: ChatState) -> bool {
        use ChatState::*;
        matches!(
            (self, next),
            (Idle, Retrieving)
                | (Retrieving, Assembling)
                | (Assembling, AwaitingModel)
                | (AwaitingModel, Done)
        ) || (next == Failed && !matches!(self, Done | Failed))
    }
}

/// Record of the states one chat cycle passed through.
#[derive(Debug, Clone)]
pub struct ChatCycle {
    states: Vec<ChatState>,
}

impl Default for ChatCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatCycle {
    pub fn new() -> Self {
        Self {
            states: vec![ChatState::Idle],
        }
    }

    pub fn state(&self) -> ChatState {
        self.states.last().copied().unwrap_or(ChatState::Idle)
    }

    /// Every state visited, starting with `Idle`.
    pub fn states(&self) -> &[ChatState] {
        &self.states
    }

    fn advance(&mut self, next: ChatState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal chat transition {:?} -> {:?}",
            self.state(),
            next
        );
        debug!("Chat cycle {:?} -> {:?}", self.state(), next);
        self.states.push(next);
    }
}

/// An incoming chat message with the conversation so far.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Coordinates corpus, context assembly and model for each request.
pub struct ChatOrchestrator {
    corpus: Arc<dyn CorpusSource>,
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    assembler: ContextAssembler,
    generation: GenerationConfig,
    max_sources: usize,
    history_window: usize,
    retrieval_timeout: Duration,
    model_timeout: Duration,
}

impl ChatOrchestrator {
    /// Create an orchestrator with the backends selected in `settings`.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let corpus = create_source(settings)?;
        let model = create_model(&settings.model)?;

        info!(
            "Using {} corpus backend with model {}",
            corpus.name(),
            model.model_name()
        );

        Ok(Self::with_components(settings, prompts, corpus, model))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        corpus: Arc<dyn CorpusSource>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let assembler = ContextAssembler::new(prompts.persona.clone())
            .with_max_context_chars(settings.context.max_context_chars);

        Self {
            corpus,
            model,
            prompts,
            assembler,
            generation: GenerationConfig::from(&settings.model),
            max_sources: settings.context.max_sources,
            history_window: settings.context.history_window,
            retrieval_timeout: settings.retrieval_timeout(),
            model_timeout: settings.model.timeout(),
        }
    }

    /// The corpus this orchestrator reads from.
    pub fn corpus(&self) -> Arc<dyn CorpusSource> {
        self.corpus.clone()
    }

    /// Answer a chat message as the person in the videos.
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut cycle = ChatCycle::new();
        self.respond_traced(request, &mut cycle).await
    }

    /// Like [`respond`](Self::respond), recording each state in `cycle`.
    #[instrument(skip(self, request, cycle), fields(history = request.history.len()))]
    pub async fn respond_traced(
        &self,
        request: &ChatRequest,
        cycle: &mut ChatCycle,
    ) -> Result<ChatReply> {
        let message = request.message.trim();
        if message.is_empty() {
            cycle.advance(ChatState::Failed);
            return Err(VidtwinError::Validation("Message is required".to_string()));
        }

        cycle.advance(ChatState::Retrieving);
        let sources = retrieve_or_empty(
            self.corpus.as_ref(),
            message,
            self.max_sources,
            self.retrieval_timeout,
        )
        .await;
        info!("Retrieved {} sources", sources.len());

        cycle.advance(ChatState::Assembling);
        let block = self.assembler.assemble(&sources);
        let generation_request = GenerationRequest {
            system_instruction: block.system_instruction(&self.prompts),
            turns: conversation_turns(&request.history, self.history_window, message),
            config: self.generation,
        };

        cycle.advance(ChatState::AwaitingModel);
        let response = match self.call_model(&generation_request).await {
            Ok(text) => text,
            Err(e) => {
                cycle.advance(ChatState::Failed);
                return Err(e);
            }
        };

        cycle.advance(ChatState::Done);
        Ok(ChatReply {
            response,
            sources: sources.iter().map(SourceRef::from).collect(),
        })
    }

    /// Answer a question about a single video.
    #[instrument(skip(self, question))]
    pub async fn video_insights(&self, video_id: &str, question: Option<&str>) -> Result<VideoInsights> {
        if video_id.trim().is_empty() {
            return Err(VidtwinError::Validation("Video ID is required".to_string()));
        }

        let record = self
            .corpus
            .get(video_id)
            .await?
            .ok_or_else(|| VidtwinError::NotFound(format!("Video data for '{}'", video_id)))?;

        let question = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(&self.prompts.persona.default_video_question);

        let request = GenerationRequest {
            system_instruction: self.prompts.persona.video_insights_system.clone(),
            turns: vec![ConversationTurn::user(format!(
                "VIDEO CONTEXT:\n{}\n\nQUESTION: {}",
                video_context(&record),
                question
            ))],
            config: GenerationConfig {
                temperature: INSIGHTS_TEMPERATURE,
                max_output_tokens: INSIGHTS_MAX_OUTPUT_TOKENS,
                ..self.generation
            },
        };

        let insights = self.call_model(&request).await?;

        Ok(VideoInsights {
            insights,
            video_id: video_id.to_string(),
            topics: record.topics,
            tags: record.tags,
        })
    }

    /// Release the corpus connection.
    pub async fn shutdown(&self) {
        self.corpus.close().await;
    }

    /// Call the model, cancelling it if it outlives the configured timeout.
    async fn call_model(&self, request: &GenerationRequest) -> Result<String> {
        match tokio::time::timeout(self.model_timeout, self.model.generate(request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                warn!("Model call failed: {}", e);
                Err(match e {
                    VidtwinError::ModelCall(_) => e,
                    other => VidtwinError::ModelCall(other.to_string()),
                })
            }
            Err(_) => {
                warn!("Model call timed out after {:?}", self.model_timeout);
                Err(VidtwinError::ModelCall(format!(
                    "timed out after {}s",
                    self.model_timeout.as_secs()
                )))
            }
        }
    }
}

/// Full single-video context, including insight metadata.
fn video_context(record: &VideoRecord) -> String {
    let insights = record
        .insights
        .iter()
        .map(|i| format!("- {} ({}, certainty: {})", i.insight, i.kind, i.certainty))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "VIDEO TRANSCRIPT:\n{}\n\nVIDEO SUMMARY:\n{}\n\nSCREEN CONTENT:\n{}\n\nTOPICS: {}\nTAGS: {}\n\nINSIGHTS:\n{}",
        record.transcript,
        record.summary,
        record.screen_content,
        record.topics.join(", "),
        record.tags.join(", "),
        insights
    )
}
