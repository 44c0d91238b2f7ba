//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod chat;
pub mod export;
pub mod prompt;
pub mod response;
pub mod settings;

pub use chat::*;
pub use export::*;
pub use prompt::*;
pub use response::*;
pub use settings::*;
