//! Integration Tests Module
//!
//! End-to-end tests through the command layer against an in-memory SQLite
//! store. Chat tests talk to a wiremock server instead of a real model.

mod common;

// Prompt library, tags and search
mod prompt_library_test;

// Selective export/import, backups and store events
mod transfer_test;

// Chat exchange through the OpenAI-compatible client
mod chat_test;
