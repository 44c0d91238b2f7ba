//! Prompt Stash LLM
//!
//! Chat-completion client for OpenAI-compatible endpoints:
//! - request/response types and typed errors
//! - the `ChatProvider` trait with cancellation and deadlines
//! - the SSE streaming adapter and HTTP client factory

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod streaming_adapters;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::ChatProvider;
pub use types::*;

// Re-export streaming adapters
pub use streaming_adapters::OpenAIAdapter;
