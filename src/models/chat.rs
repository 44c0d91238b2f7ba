//! Chat Models
//!
//! Chats and their messages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::now_iso;
use prompt_stash_core::{CoreError, CoreResult};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single chat message; immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Model reasoning returned separately from the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            reasoning_content: None,
            timestamp: now_iso(),
        }
    }
}

/// A conversation, optionally linked to a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Weak reference; a dangling id is ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Chat {
    /// Check record invariants that the type system cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::validation("chat id cannot be empty"));
        }
        if let Some(pos) = self.messages.iter().position(|m| m.id.trim().is_empty()) {
            return Err(CoreError::validation(format!(
                "chat {} has a message without id at position {}",
                self.id, pos
            )));
        }
        Ok(())
    }
}
