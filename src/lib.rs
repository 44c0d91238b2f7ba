//! Prompt Stash - Rust Backend Library
//!
//! Local prompt library with chats, settings and selective snapshot
//! transfer. It includes:
//! - Command handlers shared by front ends
//! - Business logic services
//! - Storage layer (SQLite key-value store, encrypted credential, config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::response::*;
pub use state::AppState;
pub use storage::{KvStore, StoreEvent};
pub use utils::error::{AppError, AppResult};
