//! Prompt Commands
//!
//! Command handlers for the prompt library.

use crate::models::prompt::{Prompt, PromptCreateRequest, PromptUpdateRequest};
use crate::models::response::CommandResponse;
use crate::services::prompt::PromptService;
use crate::services::search::PromptQuery;
use crate::state::AppState;

/// List prompts matching a query
pub async fn list_prompts(query: PromptQuery, state: &AppState) -> CommandResponse<Vec<Prompt>> {
    state
        .with_store(|kv| Ok(PromptService::new(kv.clone()).query_prompts(&query)))
        .await
        .into()
}

/// Get a single prompt
pub async fn get_prompt(id: String, state: &AppState) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).get_prompt(&id))
        .await
        .into()
}

/// Create a new prompt
pub async fn create_prompt(
    request: PromptCreateRequest,
    state: &AppState,
) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).create_prompt(request))
        .await
        .into()
}

/// Update an existing prompt
pub async fn update_prompt(
    id: String,
    request: PromptUpdateRequest,
    state: &AppState,
) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).update_prompt(&id, request))
        .await
        .into()
}

/// Delete a prompt
pub async fn delete_prompt(id: String, state: &AppState) -> CommandResponse<()> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).delete_prompt(&id))
        .await
        .into()
}

/// Record usage of a prompt
pub async fn record_prompt_use(id: String, state: &AppState) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).record_use(&id))
        .await
        .into()
}

/// Set the rating of a prompt
pub async fn set_prompt_rating(id: String, rating: u8, state: &AppState) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).set_rating(&id, rating))
        .await
        .into()
}

/// Toggle favorite status of a prompt
pub async fn toggle_prompt_favorite(id: String, state: &AppState) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).toggle_favorite(&id))
        .await
        .into()
}

/// Toggle archived status of a prompt
pub async fn toggle_prompt_archived(id: String, state: &AppState) -> CommandResponse<Prompt> {
    state
        .with_store(|kv| PromptService::new(kv.clone()).toggle_archived(&id))
        .await
        .into()
}

/// Distinct tags across the library
pub async fn list_tags(state: &AppState) -> CommandResponse<Vec<String>> {
    state
        .with_store(|kv| Ok(PromptService::new(kv.clone()).list_tags()))
        .await
        .into()
}

/// Tag auto-complete
pub async fn suggest_tags(
    partial: String,
    current: Vec<String>,
    limit: usize,
    state: &AppState,
) -> CommandResponse<Vec<String>> {
    state
        .with_store(|kv| Ok(PromptService::new(kv.clone()).suggest_tags(&partial, &current, limit)))
        .await
        .into()
}
