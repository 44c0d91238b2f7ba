//! Snapshot Export/Import Models
//!
//! The JSON snapshot document, the options that select which collections take
//! part in a transfer, and backup records written before every import.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chat::Chat;
use super::prompt::Prompt;
use super::settings::AppSettings;

/// Application name written into every snapshot
pub const APP_NAME: &str = "PROMPT STASH";

/// Snapshot format version
pub const EXPORT_VERSION: &str = "1.0.0";

/// One of the three exportable collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Prompts,
    Chats,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Prompts, Self::Chats, Self::Settings];

    /// Field name inside the snapshot document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompts => "prompts",
            Self::Chats => "chats",
            Self::Settings => "settings",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prompts => "Prompts",
            Self::Chats => "Chats",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which collections to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub prompts: bool,
    pub chats: bool,
    pub settings: bool,
}

impl ExportOptions {
    /// Every collection selected
    pub fn all() -> Self {
        Self {
            prompts: true,
            chats: true,
            settings: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.prompts && !self.chats && !self.settings
    }

    pub fn is_all(&self) -> bool {
        self.prompts && self.chats && self.settings
    }

    /// Selected collections in canonical order
    pub fn selected(&self) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|c| self.includes(*c))
            .collect()
    }

    pub fn includes(&self, collection: Collection) -> bool {
        match collection {
            Collection::Prompts => self.prompts,
            Collection::Chats => self.chats,
            Collection::Settings => self.settings,
        }
    }
}

/// A portable snapshot of (part of) the library.
///
/// Never carries the API credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: String,
    pub version: String,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<Prompt>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chats: Option<Vec<Chat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
}

/// How imported collections are combined with local data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Overwrite records with the same id, append the rest
    #[default]
    Merge,
    /// Overwrite whole collections verbatim
    Replace,
}

/// Which collections to import and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub prompts: bool,
    pub chats: bool,
    pub settings: bool,
    pub mode: ImportMode,
}

impl ImportOptions {
    /// Every collection selected, with the given mode
    pub fn all(mode: ImportMode) -> Self {
        Self {
            prompts: true,
            chats: true,
            settings: true,
            mode,
        }
    }

    pub fn includes(&self, collection: Collection) -> bool {
        match collection {
            Collection::Prompts => self.prompts,
            Collection::Chats => self.chats,
            Collection::Settings => self.settings,
        }
    }
}

/// Outcome of an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Store key of the backup written before the import
    pub backup_key: String,
    /// Collections written
    pub imported: Vec<Collection>,
    /// Selected collections absent from the document
    pub skipped: Vec<Collection>,
}

/// Full pre-import state, stored under `backup-<timestamp>`.
///
/// Collections are kept as they were stored, so a value that no longer
/// deserializes into its model is still preserved. Absent keys are null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub created_at: String,
    #[serde(default)]
    pub prompts: Value,
    #[serde(default)]
    pub chats: Value,
    #[serde(default)]
    pub settings: Value,
}

/// Backup listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub key: String,
    pub created_at: String,
    pub prompt_count: usize,
    pub chat_count: usize,
}
