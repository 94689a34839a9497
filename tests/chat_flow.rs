//! End-to-end chat flow over both corpus backends.

mod common;

use common::{dataset_record, write_record, RecordingModel};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vidtwin::config::{Prompts, Settings};
use vidtwin::corpus::{CorpusSource, IndexSource, ScanSource};
use vidtwin::orchestrator::{ChatOrchestrator, ChatRequest};
use vidtwin::record::{normalize, LIST_DELIMITER};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator(corpus: Arc<dyn CorpusSource>, model: Arc<RecordingModel>) -> ChatOrchestrator {
    ChatOrchestrator::with_components(&Settings::default(), Prompts::default(), corpus, model)
}

#[tokio::test]
async fn scan_backend_drives_context_and_sources() {
    let dir = tempfile::tempdir().unwrap();
    write_record(
        dir.path(),
        "2024-03-01",
        &dataset_record(
            "Today I set up my homelab with Proxmox",
            "Homelab tour",
            &["homelab", "proxmox"],
            json!([
                {"type": "interest", "insight": "Enjoys tinkering with servers"},
                {"type": "experience", "insight": "Has run Proxmox for two years"},
                {"type": "mood", "insight": "Excited"}
            ]),
        ),
    );
    write_record(
        dir.path(),
        "2024-03-02",
        &dataset_record("Baking sourdough again", "Bread", &["baking"], json!([])),
    );

    let model = Arc::new(RecordingModel::replying("My homelab is my happy place."));
    let orch = orchestrator(Arc::new(ScanSource::new(dir.path())), model.clone());

    let reply = orch
        .respond(&ChatRequest::new("tell me about your homelab"))
        .await
        .unwrap();

    assert_eq!(reply.response, "My homelab is my happy place.");
    assert_eq!(reply.sources[0].id, "2024-03-01");
    assert_eq!(reply.sources[0].summary, "Homelab tour");

    let system = model.last_system_instruction();
    assert!(system.contains("Enjoys tinkering with servers"));
    assert!(system.contains("Has run Proxmox for two years"));
    assert!(!system.contains("Excited"));
    assert!(system.contains("VIDEO_CONTEXT: 2024-03-01\nTRANSCRIPT: Today I set up my homelab"));
}

#[tokio::test]
async fn index_backend_yields_same_records_as_scan() {
    let raw = dataset_record(
        "Walking through my Rust CLI",
        "Rust CLI demo",
        &["rust", "cli tools"],
        json!([{"type": "skill", "insight": "Writes Rust", "certainty": "high", "basis": "Code on screen"}]),
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [["demo"]],
            "metadatas": [[{
                "filename": "demo.json",
                "videoFileName": "clip.mp4",
                "summary": "Rust CLI demo",
                "transcript": "Walking through my Rust CLI",
                "topics": (["rust", "cli tools"].join(LIST_DELIMITER)),
                "tags": "vlog",
                "insights": raw["inferred_insights"].to_string()
            }]],
            "distances": [[0.1]]
        })))
        .mount(&server)
        .await;

    let index = IndexSource::new(&server.uri(), "videos", Duration::from_secs(5)).unwrap();
    let hits = index.retrieve("rust", 5).await.unwrap();
    assert_eq!(hits[0].record, normalize(&raw, "demo"));

    let model = Arc::new(RecordingModel::replying("Sure."));
    let orch = orchestrator(Arc::new(index), model.clone());
    let reply = orch.respond(&ChatRequest::new("rust")).await.unwrap();

    assert_eq!(reply.sources.len(), 1);
    assert!(model.last_system_instruction().contains("Writes Rust"));
}

#[tokio::test]
async fn missing_dataset_directory_degrades_to_generic_persona() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(RecordingModel::replying("Hey!"));
    let orch = orchestrator(
        Arc::new(ScanSource::new(dir.path().join("does-not-exist"))),
        model.clone(),
    );

    let reply = orch.respond(&ChatRequest::new("hello")).await.unwrap();
    assert!(reply.sources.is_empty());

    let persona = Prompts::default().persona;
    let system = model.last_system_instruction();
    assert!(system.contains(&persona.fallback_personality));
    assert!(system.contains(&persona.fallback_knowledge));
}

#[tokio::test]
async fn model_failure_surfaces_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(
        Arc::new(ScanSource::new(dir.path())),
        Arc::new(RecordingModel::failing()),
    );

    let err = orch.respond(&ChatRequest::new("hello")).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert!(err.user_message().contains("upstream 503"));
}
