//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;
use vidtwin::model::{GenerationRequest, LanguageModel};
use vidtwin::{Result, VidtwinError};

/// Model stub that returns a fixed reply and keeps every request.
pub struct RecordingModel {
    reply: Option<String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_system_instruction(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.system_instruction.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| VidtwinError::ModelCall("upstream 503".to_string()))
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// A record in the nested dataset layout.
pub fn dataset_record(transcript: &str, summary: &str, topics: &[&str], insights: Value) -> Value {
    json!({
        "videoFileName": "clip.mp4",
        "analysis": {
            "transcript": transcript,
            "summary": summary,
            "screenContent": "",
            "topics": topics,
            "tags": ["vlog"]
        },
        "inferred_insights": insights
    })
}

pub fn write_record(dir: &Path, key: &str, value: &Value) {
    std::fs::write(dir.join(format!("{}.json", key)), value.to_string()).unwrap();
}
