//! Context assembly for persona responses.

use crate::config::{PersonaPrompts, Prompts};
use crate::corpus::ScoredRecord;
use crate::insight::classify_records;
use crate::model::ConversationTurn;
use crate::record::VideoRecord;
use std::collections::HashMap;

/// The model-facing payload for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    /// One rendered block per source, in rank order.
    pub record_blocks: Vec<String>,
    /// Personality traits, one per line, or the fallback sentence.
    pub personality: String,
    /// Knowledge and experiences, one per line, or the fallback sentence.
    pub knowledge: String,
}

impl ContextBlock {
    /// Record blocks separated by a blank line.
    pub fn context_text(&self) -> String {
        self.record_blocks.join("\n\n")
    }

    /// Fill the persona system template.
    pub fn system_instruction(&self, prompts: &Prompts) -> String {
        let mut vars = HashMap::new();
        vars.insert("personality".to_string(), self.personality.clone());
        vars.insert("knowledge".to_string(), self.knowledge.clone());
        vars.insert("context".to_string(), self.context_text());
        prompts.render_with_custom(&prompts.persona.system, &vars)
    }
}

/// Builds [`ContextBlock`]s from ranked sources.
///
/// The number of blocks is bounded by how many sources the caller retrieved.
/// Their size is only bounded when a character budget is configured; otherwise
/// the model provider's own input limit is the backstop.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    persona: PersonaPrompts,
    max_context_chars: Option<usize>,
}

impl ContextAssembler {
    pub fn new(persona: PersonaPrompts) -> Self {
        Self {
            persona,
            max_context_chars: None,
        }
    }

    /// Cap the total size of the record blocks, split evenly across sources.
    pub fn with_max_context_chars(mut self, max_context_chars: Option<usize>) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    pub fn assemble(&self, sources: &[ScoredRecord]) -> ContextBlock {
        let share = self
            .max_context_chars
            .filter(|_| !sources.is_empty())
            .map(|total| total / sources.len());

        let record_blocks = sources
            .iter()
            .map(|s| render_record(&s.record, share))
            .collect();

        let classified = classify_records(sources.iter().map(|s| &s.record));

        ContextBlock {
            record_blocks,
            personality: or_fallback(&classified.personality, &self.persona.fallback_personality),
            knowledge: or_fallback(&classified.knowledge, &self.persona.fallback_knowledge),
        }
    }
}

fn or_fallback(lines: &[String], fallback: &str) -> String {
    if lines.is_empty() {
        fallback.to_string()
    } else {
        lines.join("\n")
    }
}

/// Render one source. With a `max_chars` share, the transcript is cut so the
/// block fits; the other fields are never cut.
pub fn render_record(record: &VideoRecord, max_chars: Option<usize>) -> String {
    let render = |transcript: &str| {
        format!(
            "VIDEO_CONTEXT: {}\nTRANSCRIPT: {}\nSUMMARY: {}\nTOPICS: {}",
            record.filename,
            transcript,
            record.summary,
            record.topics.join(", ")
        )
    };

    let full = render(&record.transcript);
    let Some(max_chars) = max_chars else {
        return full;
    };

    let full_len = full.chars().count();
    if full_len <= max_chars {
        return full;
    }

    let overhead = full_len - record.transcript.chars().count();
    let keep = max_chars.saturating_sub(overhead);
    let truncated: String = record.transcript.chars().take(keep).collect();
    render(&truncated)
}

/// Keep the most recent `window` turns, in their original order.
pub fn window_history(history: &[ConversationTurn], window: usize) -> Vec<ConversationTurn> {
    let start = history.len().saturating_sub(window);
    history[start..].to_vec()
}

/// Windowed history followed by the new user message.
pub fn conversation_turns(
    history: &[ConversationTurn],
    window: usize,
    message: &str,
) -> Vec<ConversationTurn> {
    let mut turns = window_history(history, window);
    turns.push(ConversationTurn::user(message));
    turns
}
