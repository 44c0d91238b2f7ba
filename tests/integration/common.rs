//! Shared helpers

use prompt_stash_desktop::models::prompt::PromptCreateRequest;
use prompt_stash_desktop::storage::Database;
use prompt_stash_desktop::AppState;

/// Initialized state over an in-memory database; keep the TempDir alive
pub async fn test_state() -> (AppState, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("temp dir");
    let state = AppState::new();
    state
        .initialize_with(
            Database::new_in_memory().expect("in-memory database"),
            temp.path(),
        )
        .await
        .expect("initialize state");
    (state, temp)
}

pub fn prompt_request(title: &str, tags: &[&str]) -> PromptCreateRequest {
    PromptCreateRequest {
        title: title.to_string(),
        content: format!("Content of {}", title),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}
