//! OpenAI-Compatible Provider
//!
//! Implementation of the ChatProvider trait for OpenAI-style
//! `/chat/completions` endpoints, streamed (SSE) or not.

use std::future::Future;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::provider::{missing_api_key_error, parse_http_error, ChatProvider};
use super::types::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, LlmError, LlmResult, ProviderConfig,
    RequestOptions,
};
use crate::http_client::build_http_client;
use crate::streaming_adapters::OpenAIAdapter;
use prompt_stash_core::streaming::{ChatStreamEvent, StreamAdapter};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request_body<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: RequestOptions,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: options.temperature.unwrap_or(self.config.temperature),
            stream,
        }
    }

    /// POST the request and map non-200 statuses to typed errors.
    async fn send_request(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        stream: bool,
    ) -> LlmResult<reqwest::Response> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        let body = self.build_request_body(messages, options, stream);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            stream,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, self.name()));
        }
        Ok(response)
    }

    /// Run `fut` under the configured deadline, aborting early on cancellation.
    async fn guarded<T, F>(&self, fut: F, cancel: CancellationToken) -> LlmResult<T>
    where
        F: Future<Output = LlmResult<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = tokio::time::timeout(self.config.timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(LlmError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                }),
            },
        }
    }

    async fn complete_inner(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
    ) -> LlmResult<ChatCompletion> {
        let response = self.send_request(messages, options, false).await?;
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        let parsed: CompletionResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError {
                message: "response contained no choices".to_string(),
            })?;

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            reasoning_content: choice.message.reasoning_content.filter(|s| !s.is_empty()),
            finish_reason: choice.finish_reason,
        })
    }

    async fn stream_inner(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> LlmResult<ChatCompletion> {
        let response = self.send_request(messages, options, true).await?;

        let mut adapter = OpenAIAdapter::new();
        let mut completion = ChatCompletion::default();
        let mut reasoning = String::new();
        let mut stream = response.bytes_stream();
        // Raw bytes so a multi-byte character split across chunks survives.
        let mut buffer: Vec<u8> = Vec::new();

        'read: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;
            buffer.extend_from_slice(&chunk);

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line);
                if line.trim().is_empty() {
                    continue;
                }
                apply_line(&mut adapter, &line, &mut completion, &mut reasoning, &tx).await?;
                if adapter.is_done() {
                    break 'read;
                }
            }
        }

        if !adapter.is_done() && !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).into_owned();
            apply_line(&mut adapter, &line, &mut completion, &mut reasoning, &tx).await?;
        }

        if !adapter.is_done() {
            tracing::warn!("chat stream ended without [DONE] marker");
        }

        if !reasoning.is_empty() {
            completion.reasoning_content = Some(reasoning);
        }
        Ok(completion)
    }
}

/// Feed one SSE line through the adapter, accumulating and forwarding events.
async fn apply_line(
    adapter: &mut OpenAIAdapter,
    line: &str,
    completion: &mut ChatCompletion,
    reasoning: &mut String,
    tx: &mpsc::Sender<ChatStreamEvent>,
) -> LlmResult<()> {
    let events = adapter.adapt(line).map_err(|e| LlmError::ParseError {
        message: e.to_string(),
    })?;

    for event in events {
        match &event {
            ChatStreamEvent::TextDelta { content } => completion.content.push_str(content),
            ChatStreamEvent::ReasoningDelta { content } => reasoning.push_str(content),
            ChatStreamEvent::Complete { finish_reason } => {
                completion.finish_reason = finish_reason.clone();
            }
            ChatStreamEvent::Error { message } => {
                let message = message.clone();
                let _ = tx.send(event).await;
                return Err(LlmError::Other { message });
            }
        }
        // Receiver may be gone; the accumulated completion is still returned.
        let _ = tx.send(event).await;
    }
    Ok(())
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        cancel: CancellationToken,
    ) -> LlmResult<ChatCompletion> {
        self.guarded(self.complete_inner(messages, options), cancel)
            .await
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        tx: mpsc::Sender<ChatStreamEvent>,
        cancel: CancellationToken,
    ) -> LlmResult<ChatCompletion> {
        self.guarded(self.stream_inner(messages, options, tx), cancel)
            .await
    }
}
