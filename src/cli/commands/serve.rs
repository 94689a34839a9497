//! HTTP API server.
//!
//! Exposes chat, corpus browsing and single-video insights as JSON endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::topic_catalogue;
use crate::error::VidtwinError;
use crate::orchestrator::{ChatOrchestrator, ChatRequest};
use crate::record::{Insight, VideoRecord};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

type AppState = Arc<ChatOrchestrator>;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: &Settings) -> anyhow::Result<()> {
    let orchestrator = Arc::new(ChatOrchestrator::new(settings)?);
    let app = router(orchestrator.clone());

    let addr = format!(
        "{}:{}",
        host.unwrap_or(&settings.server.host),
        port.unwrap_or(settings.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Vidtwin API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Videos", "GET  /api/videos");
    Output::kv("Topics", "GET  /api/topics");
    Output::kv("Transcript", "GET  /api/transcript/{id}");
    Output::kv("Video insights", "POST /api/video-insights");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    orchestrator.shutdown().await;
    Ok(())
}

/// Build the API router.
pub fn router(orchestrator: Arc<ChatOrchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/videos", get(list_videos))
        .route("/api/topics", get(topics))
        .route("/api/transcript/{id}", get(transcript))
        .route("/api/video-insights", post(video_insights))
        .layer(cors)
        .with_state(orchestrator)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct VideoSummary {
    id: String,
    filename: String,
    timestamp: String,
    summary: String,
    topics: Vec<String>,
    tags: Vec<String>,
}

impl From<VideoRecord> for VideoSummary {
    fn from(record: VideoRecord) -> Self {
        Self {
            summary: if record.summary.is_empty() {
                "No summary available".to_string()
            } else {
                record.summary
            },
            id: record.id,
            filename: record.video_file,
            timestamp: record.filename,
            topics: record.topics,
            tags: record.tags,
        }
    }
}

#[derive(Serialize)]
struct TopicsResponse {
    topics: Vec<String>,
    total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptResponse {
    id: String,
    video_file_name: String,
    transcript: String,
    summary: String,
    topics: Vec<String>,
    tags: Vec<String>,
    insights: Vec<Insight>,
    screen_content: String,
}

impl From<VideoRecord> for TranscriptResponse {
    fn from(record: VideoRecord) -> Self {
        Self {
            id: record.id,
            video_file_name: record.video_file,
            transcript: record.transcript,
            summary: record.summary,
            topics: record.topics,
            tags: record.tags,
            insights: record.insights,
            screen_content: record.screen_content,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInsightsRequest {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    question: Option<String>,
}

fn error_response(e: VidtwinError) -> Response {
    error!("Request failed: {}", e);
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    match state.respond(&req).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_videos(State(state): State<AppState>) -> Response {
    match state.corpus().list().await {
        Ok(records) => Json(
            records
                .into_iter()
                .map(VideoSummary::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn topics(State(state): State<AppState>) -> Response {
    match state.corpus().list().await {
        Ok(records) => {
            let topics = topic_catalogue(&records);
            Json(TopicsResponse {
                total: topics.len(),
                topics,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn transcript(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.corpus().get(&id).await {
        Ok(Some(record)) => Json(TranscriptResponse::from(record)).into_response(),
        Ok(None) => error_response(VidtwinError::NotFound("Transcript".to_string())),
        Err(e) => error_response(e),
    }
}

async fn video_insights(
    State(state): State<AppState>,
    Json(req): Json<VideoInsightsRequest>,
) -> Response {
    match state
        .video_insights(&req.video_id, req.question.as_deref())
        .await
    {
        Ok(insights) => Json(insights).into_response(),
        Err(e) => error_response(e),
    }
}
