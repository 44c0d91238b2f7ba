//! Chat Commands
//!
//! Command handlers for chats and message sending.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::chat::Chat;
use crate::models::response::CommandResponse;
use crate::services::chat::ChatService;
use crate::state::AppState;
use crate::utils::error::AppResult;
use prompt_stash_core::ChatStreamEvent;

/// List all chats
pub async fn list_chats(state: &AppState) -> CommandResponse<Vec<Chat>> {
    state
        .with_store(|kv| Ok(ChatService::new(kv.clone()).list_chats()))
        .await
        .into()
}

/// Get a single chat
pub async fn get_chat(id: String, state: &AppState) -> CommandResponse<Chat> {
    state
        .with_store(|kv| ChatService::new(kv.clone()).get_chat(&id))
        .await
        .into()
}

/// Create a chat, optionally linked to a prompt
pub async fn create_chat(
    title: Option<String>,
    prompt_id: Option<String>,
    state: &AppState,
) -> CommandResponse<Chat> {
    state
        .with_store(|kv| ChatService::new(kv.clone()).create_chat(title, prompt_id))
        .await
        .into()
}

/// Delete a chat
pub async fn delete_chat(id: String, state: &AppState) -> CommandResponse<()> {
    state
        .with_store(|kv| ChatService::new(kv.clone()).delete_chat(&id))
        .await
        .into()
}

/// Make a chat the active one
pub async fn set_active_chat(id: String, state: &AppState) -> CommandResponse<Chat> {
    state
        .with_store(|kv| ChatService::new(kv.clone()).set_active(&id))
        .await
        .into()
}

/// Send a message; streamed events go to `stream_tx` when given
pub async fn send_chat_message(
    chat_id: String,
    content: String,
    stream_tx: Option<mpsc::Sender<ChatStreamEvent>>,
    cancel: CancellationToken,
    state: &AppState,
) -> CommandResponse<Chat> {
    let result: AppResult<Chat> = async {
        let kv = state.store().await?;
        let provider = state.chat_provider().await?;
        ChatService::new(kv)
            .send_message(&provider, &chat_id, &content, stream_tx, cancel)
            .await
    }
    .await;
    result.into()
}
