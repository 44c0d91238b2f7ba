//! OpenAI-Compatible SSE Stream Adapter
//!
//! Handles the `data: {...}` line format used by OpenAI and compatible
//! endpoints (DeepSeek and others), including the separate
//! `reasoning_content` delta some reasoning models emit.

use prompt_stash_core::streaming::{AdapterError, ChatStreamEvent, StreamAdapter};
use serde::Deserialize;

/// Marker payload that ends an SSE stream
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: Option<String>,
}

/// Adapter for OpenAI-compatible chat completion streams
#[derive(Debug, Default)]
pub struct OpenAIAdapter {
    /// Last finish_reason seen, reported with the Complete event
    finish_reason: Option<String>,
    done: bool,
}

impl OpenAIAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl StreamAdapter for OpenAIAdapter {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<ChatStreamEvent>, AdapterError> {
        let trimmed = input.trim();

        // Only `data:` lines carry payloads; comments, `event:` and `id:` lines are skipped.
        let Some(payload) = trimmed.strip_prefix("data:") else {
            return Ok(vec![]);
        };
        let payload = payload.trim_start();

        if payload.is_empty() {
            return Ok(vec![]);
        }

        if payload == DONE_MARKER {
            self.done = true;
            return Ok(vec![ChatStreamEvent::Complete {
                finish_reason: self.finish_reason.take(),
            }]);
        }

        let chunk: StreamChunk = serde_json::from_str(payload)
            .map_err(|e| AdapterError::ParseError(format!("{}: {}", e, payload)))?;

        if let Some(error) = chunk.error {
            return Ok(vec![ChatStreamEvent::Error {
                message: error
                    .message
                    .unwrap_or_else(|| "unknown stream error".to_string()),
            }]);
        }

        let mut events = Vec::new();
        for choice in chunk.choices {
            if let Some(delta) = choice.delta {
                if let Some(reasoning) = delta.reasoning_content.filter(|s| !s.is_empty()) {
                    events.push(ChatStreamEvent::ReasoningDelta { content: reasoning });
                }
                if let Some(content) = delta.content.filter(|s| !s.is_empty()) {
                    events.push(ChatStreamEvent::TextDelta { content });
                }
            }
            if choice.finish_reason.is_some() {
                self.finish_reason = choice.finish_reason;
            }
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.finish_reason = None;
        self.done = false;
    }
}
