//! Chat Provider Trait
//!
//! Defines the common interface for chat-completion backends.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::types::{ChatCompletion, ChatMessage, LlmError, LlmResult, RequestOptions};
use prompt_stash_core::streaming::ChatStreamEvent;

/// Trait that all chat-completion backends implement.
///
/// Both calls honor `cancel`: once the token fires, the call returns
/// [`LlmError::Cancelled`] and nothing further is sent on `tx`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model being used.
    fn model(&self) -> &str;

    /// Send the conversation and wait for the complete reply.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        cancel: CancellationToken,
    ) -> LlmResult<ChatCompletion>;

    /// Stream the reply, forwarding every decoded event on `tx`.
    ///
    /// Returns the accumulated completion once the stream ends.
    async fn stream(
        &self,
        messages: &[ChatMessage],
        options: RequestOptions,
        tx: mpsc::Sender<ChatStreamEvent>,
        cancel: CancellationToken,
    ) -> LlmResult<ChatCompletion>;
}

/// Helper function to create an error for a missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to map HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
