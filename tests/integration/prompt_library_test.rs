//! Prompt Library Integration Tests
//!
//! Create/update/search through the command layer:
//! - Tags normalized against the existing library
//! - Text and tag filtering, category and favorites
//! - Usage tracking and sorting

use prompt_stash_desktop::commands;
use prompt_stash_desktop::models::prompt::PromptUpdateRequest;
use prompt_stash_desktop::services::search::{PromptQuery, PromptSort};

use crate::common::{prompt_request, test_state};

#[tokio::test]
async fn test_tags_reuse_library_casing() {
    let (state, _temp) = test_state().await;

    let first = commands::create_prompt(prompt_request("Rust tips", &["rust", "CLI"]), &state)
        .await
        .data
        .unwrap();
    assert_eq!(first.tags, vec!["Rust", "CLI"]);

    let second = commands::create_prompt(
        prompt_request("Shell tricks", &[" cli ", "RUST", "rust", "", "bash"]),
        &state,
    )
    .await
    .data
    .unwrap();
    assert_eq!(second.tags, vec!["CLI", "Rust", "Bash"]);

    let tags = commands::list_tags(&state).await.data.unwrap();
    assert_eq!(tags, vec!["Rust", "CLI", "Bash"]);

    let suggestions = commands::suggest_tags("r".to_string(), vec!["Rust".to_string()], 5, &state)
        .await
        .data
        .unwrap();
    assert!(suggestions.is_empty());

    let suggestions = commands::suggest_tags("as".to_string(), Vec::new(), 5, &state)
        .await
        .data
        .unwrap();
    assert_eq!(suggestions, vec!["Bash"]);
}

#[tokio::test]
async fn test_update_normalizes_against_other_prompts() {
    let (state, _temp) = test_state().await;
    commands::create_prompt(prompt_request("A", &["Writing"]), &state).await;
    let b = commands::create_prompt(prompt_request("B", &[]), &state)
        .await
        .data
        .unwrap();

    let updated = commands::update_prompt(
        b.id.clone(),
        PromptUpdateRequest {
            tags: Some(vec!["writing".to_string(), "email".to_string()]),
            ..Default::default()
        },
        &state,
    )
    .await
    .data
    .unwrap();

    assert_eq!(updated.tags, vec!["Writing", "Email"]);
    assert_eq!(updated.title, "B");
}

#[tokio::test]
async fn test_query_filters_and_sorts() {
    let (state, _temp) = test_state().await;
    let email = commands::create_prompt(prompt_request("Email draft", &["writing"]), &state)
        .await
        .data
        .unwrap();
    let review = commands::create_prompt(prompt_request("Code review", &["code"]), &state)
        .await
        .data
        .unwrap();
    let old = commands::create_prompt(prompt_request("Old notes", &["writing"]), &state)
        .await
        .data
        .unwrap();

    commands::toggle_prompt_archived(old.id.clone(), &state).await;
    commands::toggle_prompt_favorite(review.id.clone(), &state).await;
    commands::record_prompt_use(review.id.clone(), &state).await;
    commands::record_prompt_use(review.id.clone(), &state).await;

    let writing = commands::list_prompts(
        PromptQuery {
            tags: vec!["WRITING".to_string()],
            ..Default::default()
        },
        &state,
    )
    .await
    .data
    .unwrap();
    let ids: Vec<_> = writing.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![email.id.as_str()]);

    let with_archived = commands::list_prompts(
        PromptQuery {
            text: "notes".to_string(),
            include_archived: true,
            ..Default::default()
        },
        &state,
    )
    .await
    .data
    .unwrap();
    assert_eq!(with_archived.len(), 1);
    assert_eq!(with_archived[0].id, old.id);

    let favorites = commands::list_prompts(
        PromptQuery {
            favorites_only: true,
            ..Default::default()
        },
        &state,
    )
    .await
    .data
    .unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].usage, 2);

    let by_usage = commands::list_prompts(
        PromptQuery {
            sort: PromptSort::MostUsed,
            ..Default::default()
        },
        &state,
    )
    .await
    .data
    .unwrap();
    assert_eq!(by_usage[0].id, review.id);
}

#[tokio::test]
async fn test_rating_bounds_and_missing_ids() {
    let (state, _temp) = test_state().await;
    let prompt = commands::create_prompt(prompt_request("Rated", &[]), &state)
        .await
        .data
        .unwrap();

    let rated = commands::set_prompt_rating(prompt.id.clone(), 5, &state).await;
    assert_eq!(rated.data.unwrap().rating, 5);

    let too_high = commands::set_prompt_rating(prompt.id.clone(), 6, &state).await;
    assert!(!too_high.success);

    let missing = commands::delete_prompt("nope".to_string(), &state).await;
    assert!(!missing.success);

    assert!(commands::delete_prompt(prompt.id, &state).await.success);
    assert!(commands::list_prompts(PromptQuery::default(), &state)
        .await
        .data
        .unwrap()
        .is_empty());
}
