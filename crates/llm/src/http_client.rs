//! HTTP Client Factory
//!
//! Builds the reqwest client used for chat completion calls.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Connect timeout applied to every client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a `reqwest::Client` with a connect timeout.
///
/// The overall request deadline is enforced by the provider so that streamed
/// responses are not cut off by a whole-body timeout.
pub fn build_http_client() -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Other {
            message: format!("failed to build HTTP client: {}", e),
        })
}
