//! Chat Service
//!
//! Chat CRUD plus message sending. A send is a two-phase commit: the user
//! message is staged in memory, the model is called, and only on success are
//! the user and assistant messages appended to the stored chat. Errors,
//! timeouts and cancellation leave the store untouched.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::chat::{Chat, Message, MessageRole};
use crate::models::prompt::Prompt;
use crate::models::settings::AppSettings;
use crate::storage::kv::{KvStore, CHATS_KEY, PROMPTS_KEY, SETTINGS_KEY};
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::now_iso;
use prompt_stash_core::ChatStreamEvent;
use prompt_stash_llm::{ChatMessage, ChatProvider, ChatRole, RequestOptions};

/// Service for managing chats
#[derive(Debug, Clone)]
pub struct ChatService {
    kv: KvStore,
}

impl ChatService {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// All chats, most recently created first
    pub fn list_chats(&self) -> Vec<Chat> {
        self.kv.get(CHATS_KEY, Vec::new())
    }

    /// Get a single chat by ID
    pub fn get_chat(&self, id: &str) -> AppResult<Chat> {
        self.list_chats()
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Create a chat at the front of the list and make it the active one
    pub fn create_chat(&self, title: Option<String>, prompt_id: Option<String>) -> AppResult<Chat> {
        if let Some(prompt_id) = &prompt_id {
            let prompts: Vec<Prompt> = self.kv.get(PROMPTS_KEY, Vec::new());
            if !prompts.iter().any(|p| &p.id == prompt_id) {
                return Err(AppError::not_found(format!("prompt {}", prompt_id)));
            }
        }

        let mut chats = self.list_chats();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("New Chat {}", chats.len() + 1));

        let now = now_iso();
        let chat = Chat {
            id: Uuid::new_v4().to_string(),
            title,
            messages: Vec::new(),
            prompt_id,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        for existing in chats.iter_mut() {
            existing.is_active = false;
        }
        chats.insert(0, chat.clone());
        self.kv.set(CHATS_KEY, &chats);
        tracing::info!(id = %chat.id, "created chat");
        Ok(chat)
    }

    /// Delete a chat
    pub fn delete_chat(&self, id: &str) -> AppResult<()> {
        let mut chats = self.list_chats();
        let index = position(&chats, id)?;
        chats.remove(index);
        self.kv.set(CHATS_KEY, &chats);
        tracing::info!(id, "deleted chat");
        Ok(())
    }

    /// Make `id` the only active chat
    pub fn set_active(&self, id: &str) -> AppResult<Chat> {
        let mut chats = self.list_chats();
        let index = position(&chats, id)?;
        for (i, chat) in chats.iter_mut().enumerate() {
            chat.is_active = i == index;
        }
        let active = chats[index].clone();
        self.kv.set(CHATS_KEY, &chats);
        Ok(active)
    }

    /// Send `content` to the model and commit the exchange on success.
    ///
    /// With `stream_tx`, the reply is streamed and every decoded event is
    /// forwarded. Returns the updated chat.
    pub async fn send_message(
        &self,
        provider: &dyn ChatProvider,
        chat_id: &str,
        content: &str,
        stream_tx: Option<mpsc::Sender<ChatStreamEvent>>,
        cancel: CancellationToken,
    ) -> AppResult<Chat> {
        if content.trim().is_empty() {
            return Err(AppError::validation("message cannot be empty"));
        }

        // Phase 1: stage
        let chat = self.get_chat(chat_id)?;
        let user_message = Message::new(MessageRole::User, content);
        let request = self.build_request(&chat, &user_message);

        let settings: AppSettings = self.kv.get(SETTINGS_KEY, AppSettings::default());
        let options = RequestOptions {
            temperature: Some(settings.agent_settings.temperature),
            max_tokens: Some(settings.agent_settings.max_tokens),
        };

        tracing::info!(
            chat_id,
            provider = provider.name(),
            model = provider.model(),
            messages = request.len(),
            streaming = stream_tx.is_some(),
            "sending chat message"
        );

        let result = match stream_tx {
            Some(tx) => provider.stream(&request, options, tx, cancel).await,
            None => provider.complete(&request, options, cancel).await,
        };

        let completion = match result {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "chat request failed, discarding staged message");
                return Err(e.into());
            }
        };

        // Phase 2: commit against the current store contents
        let mut assistant_message = Message::new(MessageRole::Assistant, completion.content);
        assistant_message.reasoning_content =
            completion.reasoning_content.filter(|r| !r.trim().is_empty());

        let mut chats = self.list_chats();
        let index = position(&chats, chat_id)?;
        let chat = &mut chats[index];
        chat.messages.push(user_message);
        chat.messages.push(assistant_message);
        chat.updated_at = now_iso();

        let updated = chat.clone();
        self.kv.set(CHATS_KEY, &chats);
        tracing::info!(chat_id, messages = updated.messages.len(), "committed chat exchange");
        Ok(updated)
    }

    /// System prompt (if the linked prompt still exists), history, staged message
    fn build_request(&self, chat: &Chat, staged: &Message) -> Vec<ChatMessage> {
        let mut request = Vec::with_capacity(chat.messages.len() + 2);

        if let Some(prompt_id) = &chat.prompt_id {
            let prompts: Vec<Prompt> = self.kv.get(PROMPTS_KEY, Vec::new());
            match prompts.iter().find(|p| &p.id == prompt_id) {
                Some(prompt) => request.push(ChatMessage::system(prompt.content.clone())),
                None => tracing::debug!(prompt_id = %prompt_id, "linked prompt no longer exists"),
            }
        }

        request.extend(
            chat.messages
                .iter()
                .map(|m| ChatMessage::new(to_chat_role(m.role), m.content.clone())),
        );
        request.push(ChatMessage::user(staged.content.clone()));
        request
    }
}

fn to_chat_role(role: MessageRole) -> ChatRole {
    match role {
        MessageRole::User => ChatRole::User,
        MessageRole::Assistant => ChatRole::Assistant,
        MessageRole::System => ChatRole::System,
    }
}

fn position(chats: &[Chat], id: &str) -> AppResult<usize> {
    chats
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("chat {}", id))
}
