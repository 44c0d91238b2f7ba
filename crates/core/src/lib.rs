//! Prompt Stash Core
//!
//! Foundational types shared by the Prompt Stash workspace. This crate has no
//! dependency on storage, HTTP, or application-level code.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `tags` - Tag normalization against an existing tag corpus
//! - `streaming` - Chat stream event types and the line adapter trait
//!
//! ## Design Principles
//!
//! 1. **Only serde/thiserror** - keeps build times minimal
//! 2. **Pure functions** - tag handling is deterministic and side-effect free
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod streaming;
pub mod tags;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{AdapterError, ChatStreamEvent, StreamAdapter};

// ── Tags ───────────────────────────────────────────────────────────────
pub use tags::{collect_tags, dedupe_tags, normalize_tags, suggest_tags, Tagged};
