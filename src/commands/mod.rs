//! Commands
//!
//! Entry points called by front ends. Every command returns a
//! `CommandResponse`; errors never propagate past this layer.

pub mod chats;
pub mod health;
pub mod prompts;
pub mod settings;
pub mod transfer;

pub use chats::*;
pub use health::*;
pub use prompts::*;
pub use settings::*;
pub use transfer::*;
