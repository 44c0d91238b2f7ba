//! Storage Layer
//!
//! Handles all data persistence: SQLite key-value table, the typed store
//! adapter, the encrypted credential and the JSON runtime config.

pub mod config;
pub mod database;
pub mod keyring;
pub mod kv;

pub use config::*;
pub use database::*;
pub use keyring::*;
pub use kv::*;
