//! Chat Integration Tests
//!
//! Sends messages through the command layer to a mock server that speaks the
//! chat completions protocol:
//! - A successful exchange appends exactly two messages
//! - A failed request leaves the chat untouched
//! - Streamed deltas reach the caller and the linked prompt becomes the system message

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt_stash_core::ChatStreamEvent;
use prompt_stash_desktop::commands;
use prompt_stash_desktop::models::chat::MessageRole;
use prompt_stash_desktop::storage::Database;
use prompt_stash_desktop::AppState;

use crate::common::prompt_request;

// ============================================================================
// Helpers
// ============================================================================

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// State whose config points the chat client at `server`, with a key stored
async fn state_for(server: &MockServer) -> (AppState, tempfile::TempDir) {
    let temp = tempfile::tempdir().unwrap();
    let config = json!({
        "apiUrl": format!("{}{}", server.uri(), COMPLETIONS_PATH),
        "model": "loopback-model",
        "requestTimeoutSecs": 5
    });
    std::fs::write(temp.path().join("config.json"), config.to_string()).unwrap();

    let state = AppState::new();
    state
        .initialize_with(Database::new_in_memory().unwrap(), temp.path())
        .await
        .unwrap();
    assert!(commands::set_api_key("sk-loopback".to_string(), &state).await.success);
    (state, temp)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_successful_exchange_appends_two_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer sk-loopback"))
        .and(body_partial_json(json!({"model": "loopback-model", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello back"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (state, _temp) = state_for(&server).await;

    let chat = commands::create_chat(None, None, &state).await.data.unwrap();
    let updated = commands::send_chat_message(
        chat.id.clone(),
        "Hello".to_string(),
        None,
        CancellationToken::new(),
        &state,
    )
    .await
    .data
    .unwrap();

    assert_eq!(updated.messages.len(), 2);
    assert_eq!(updated.messages[0].role, MessageRole::User);
    assert_eq!(updated.messages[0].content, "Hello");
    assert_eq!(updated.messages[1].role, MessageRole::Assistant);
    assert_eq!(updated.messages[1].content, "Hello back");

    let stored = commands::get_chat(chat.id, &state).await.data.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_failed_exchange_leaves_chat_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"message": "upstream exploded"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (state, _temp) = state_for(&server).await;

    let chat = commands::create_chat(Some("Fragile".to_string()), None, &state)
        .await
        .data
        .unwrap();
    let response = commands::send_chat_message(
        chat.id.clone(),
        "Hello".to_string(),
        None,
        CancellationToken::new(),
        &state,
    )
    .await;

    assert!(!response.success);
    assert!(response.error.unwrap().starts_with("Chat error"));
    let stored = commands::get_chat(chat.id.clone(), &state).await.data.unwrap();
    assert_eq!(stored, chat);
}

#[tokio::test]
async fn test_streamed_reply_uses_linked_prompt() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Str\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"eamed\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({"stream": true})))
        .and(body_string_contains("\"system\""))
        .and(body_string_contains("Content of Pirate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;
    let (state, _temp) = state_for(&server).await;

    let prompt = commands::create_prompt(prompt_request("Pirate", &[]), &state)
        .await
        .data
        .unwrap();
    let chat = commands::create_chat(None, Some(prompt.id.clone()), &state)
        .await
        .data
        .unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let updated = commands::send_chat_message(
        chat.id,
        "Ahoy".to_string(),
        Some(tx),
        CancellationToken::new(),
        &state,
    )
    .await
    .data
    .unwrap();

    assert_eq!(updated.messages[1].content, "Streamed");

    let mut deltas = String::new();
    while let Some(event) = rx.recv().await {
        if let ChatStreamEvent::TextDelta { content } = event {
            deltas.push_str(&content);
        }
    }
    assert_eq!(deltas, "Streamed");
}

#[tokio::test]
async fn test_cancelled_send_keeps_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (state, _temp) = state_for(&server).await;

    let chat = commands::create_chat(None, None, &state).await.data.unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response =
        commands::send_chat_message(chat.id.clone(), "Hi".to_string(), None, cancel, &state)
            .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("cancelled"));
    assert!(commands::get_chat(chat.id, &state)
        .await
        .data
        .unwrap()
        .messages
        .is_empty());
}
