//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod chat;
pub mod prompt;
pub mod search;
pub mod settings;
pub mod transfer;

pub use chat::ChatService;
pub use prompt::PromptService;
pub use search::{filter_prompts, sort_by_recent, PromptQuery, PromptSort};
pub use settings::SettingsService;
pub use transfer::{export_filename, parse_document, TransferService};
