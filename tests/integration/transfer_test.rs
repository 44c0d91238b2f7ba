//! Transfer Integration Tests
//!
//! Selective export/import against a real store:
//! - Replace import of an export restores it exactly
//! - Merge import is idempotent
//! - A malformed collection aborts the whole import after the backup
//! - Merging over an unreadable local collection is refused; the backup keeps it
//! - Replace overwrites a collection and the backup holds what it replaced
//! - The API credential never crosses the snapshot boundary
//! - Settings merge is deep; store events reach every subscriber

use serde_json::json;

use prompt_stash_desktop::commands;
use prompt_stash_desktop::models::export::{
    Collection, ExportDocument, ExportOptions, ImportMode, ImportOptions,
};
use prompt_stash_desktop::models::settings::{SettingsPatch, Theme};
use prompt_stash_desktop::services::search::PromptQuery;
use prompt_stash_desktop::storage::{StoreEvent, CHATS_KEY, CREDENTIAL_KEY, PROMPTS_KEY};

use crate::common::{prompt_request, test_state};

async fn export_all(state: &prompt_stash_desktop::AppState) -> ExportDocument {
    commands::export_data(ExportOptions::all(), state)
        .await
        .data
        .expect("export")
}

#[tokio::test]
async fn test_replace_import_restores_export() {
    let (state, _temp) = test_state().await;
    commands::create_prompt(prompt_request("Keep me", &["alpha"]), &state).await;
    commands::create_chat(Some("Planning".to_string()), None, &state).await;
    commands::update_settings(
        SettingsPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        },
        &state,
    )
    .await;

    let snapshot = export_all(&state).await;

    // Diverge from the snapshot
    commands::create_prompt(prompt_request("Extra", &[]), &state).await;
    commands::reset_settings(&state).await;

    let value = serde_json::to_value(&snapshot).unwrap();
    let report = commands::import_data(value, ImportOptions::all(ImportMode::Replace), &state)
        .await
        .data
        .unwrap();
    assert_eq!(
        report.imported,
        vec![Collection::Prompts, Collection::Chats, Collection::Settings]
    );

    let after = export_all(&state).await;
    assert_eq!(after.prompts, snapshot.prompts);
    assert_eq!(after.chats, snapshot.chats);
    assert_eq!(after.settings, snapshot.settings);
}

#[tokio::test]
async fn test_merge_import_is_idempotent() {
    let (state, _temp) = test_state().await;
    commands::create_prompt(prompt_request("Local", &[]), &state).await;

    let incoming = json!({
        "prompts": [{
            "id": "remote-1",
            "title": "Remote",
            "content": "From another machine",
            "tags": ["Shared"],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }]
    });
    let options = ImportOptions {
        prompts: true,
        chats: false,
        settings: false,
        mode: ImportMode::Merge,
    };

    commands::import_data(incoming.clone(), options, &state).await;
    let once = export_all(&state).await.prompts.unwrap();
    commands::import_data(incoming, options, &state).await;
    let twice = export_all(&state).await.prompts.unwrap();

    assert_eq!(once.len(), 2);
    assert_eq!(once, twice);
    assert_eq!(once[1].id, "remote-1");
}

#[tokio::test]
async fn test_malformed_collection_changes_nothing_but_backs_up() {
    let (state, _temp) = test_state().await;
    commands::create_prompt(prompt_request("Original", &[]), &state).await;
    let before = export_all(&state).await;

    let document = json!({
        "prompts": [],
        "chats": "not a list"
    });
    let response =
        commands::import_data(document, ImportOptions::all(ImportMode::Replace), &state).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("chats"));

    let after = export_all(&state).await;
    assert_eq!(after.prompts, before.prompts);
    assert_eq!(after.chats, before.chats);

    let backups = commands::list_backups(&state).await.data.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].prompt_count, 1);
}

#[tokio::test]
async fn test_replace_chats_backs_up_the_replaced_array() {
    let (state, _temp) = test_state().await;
    commands::create_chat(Some("First".to_string()), None, &state).await;
    commands::create_chat(Some("Second".to_string()), None, &state).await;

    let kv = state.store().await.unwrap();
    let original = kv.get_json(CHATS_KEY).unwrap();
    assert_eq!(original.as_array().unwrap().len(), 2);

    let imported = json!([{
        "id": "chat-remote",
        "title": "From elsewhere",
        "messages": [{
            "id": "m1",
            "role": "user",
            "content": "Hello",
            "timestamp": "2024-01-01T00:00:00.000Z"
        }],
        "isActive": false,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z"
    }]);
    let options = ImportOptions {
        prompts: false,
        chats: true,
        settings: false,
        mode: ImportMode::Replace,
    };
    let report = commands::import_data(json!({ "chats": imported.clone() }), options, &state)
        .await
        .data
        .unwrap();
    assert_eq!(report.imported, vec![Collection::Chats]);

    assert_eq!(kv.get_json(CHATS_KEY), Some(imported));
    let backup = commands::get_backup(report.backup_key, &state)
        .await
        .data
        .unwrap();
    assert_eq!(backup.chats, original);
}

#[tokio::test]
async fn test_merge_over_unreadable_prompts_is_refused() {
    let (state, _temp) = test_state().await;
    let kv = state.store().await.unwrap();
    let local = json!([{
        "id": "local-1",
        "title": "Half-rated",
        "content": "Stored by an older build",
        "tags": [],
        "rating": 4.5,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z"
    }]);
    kv.set(PROMPTS_KEY, &local);

    let document = json!({
        "prompts": [{
            "id": "remote-1",
            "title": "Remote",
            "content": "From another machine",
            "tags": [],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }]
    });
    let response =
        commands::import_data(document, ImportOptions::all(ImportMode::Merge), &state).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("unreadable"));
    assert_eq!(kv.get_json(PROMPTS_KEY), Some(local.clone()));

    let backups = commands::list_backups(&state).await.data.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].prompt_count, 1);
    let backup = commands::get_backup(backups[0].key.clone(), &state)
        .await
        .data
        .unwrap();
    assert_eq!(backup.prompts, local);
}

#[tokio::test]
async fn test_imported_tags_lose_case_duplicates() {
    let (state, _temp) = test_state().await;
    let document = json!({
        "prompts": [{
            "id": "remote-1",
            "title": "Tagged",
            "content": "body",
            "tags": ["ai", "AI", " Ai"],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }]
    });
    assert!(
        commands::import_data(document, ImportOptions::all(ImportMode::Merge), &state)
            .await
            .success
    );

    let prompts = export_all(&state).await.prompts.unwrap();
    assert_eq!(prompts[0].tags, vec!["ai".to_string()]);
    let tags = commands::list_tags(&state).await.data.unwrap();
    assert_eq!(tags, vec!["ai".to_string()]);
}

#[tokio::test]
async fn test_non_object_document_is_rejected() {
    let (state, _temp) = test_state().await;
    let response =
        commands::import_data(json!([1, 2, 3]), ImportOptions::all(ImportMode::Merge), &state)
            .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Invalid import format"));
}

#[tokio::test]
async fn test_unselected_and_absent_collections() {
    let (state, _temp) = test_state().await;
    commands::create_prompt(prompt_request("Stays", &[]), &state).await;

    let document = json!({
        "prompts": [],
        "settings": null
    });
    let options = ImportOptions {
        prompts: false,
        chats: true,
        settings: true,
        mode: ImportMode::Replace,
    };
    let report = commands::import_data(document, options, &state)
        .await
        .data
        .unwrap();

    assert!(report.imported.is_empty());
    assert_eq!(report.skipped, vec![Collection::Chats, Collection::Settings]);
    let prompts = commands::list_prompts(PromptQuery::default(), &state)
        .await
        .data
        .unwrap();
    assert_eq!(prompts.len(), 1);
}

#[tokio::test]
async fn test_credential_never_crosses_snapshot() {
    let (state, _temp) = test_state().await;
    assert!(commands::set_api_key("sk-secret".to_string(), &state).await.success);

    let snapshot = export_all(&state).await;
    let text = serde_json::to_string(&snapshot).unwrap();
    assert!(!text.contains("sk-secret"));
    assert!(!text.contains(CREDENTIAL_KEY));

    let kv = state.store().await.unwrap();
    let stored = kv.get_json(CREDENTIAL_KEY);

    let hostile = json!({
        "apiKey": "sk-evil",
        CREDENTIAL_KEY: "sk-evil",
        "settings": {
            "theme": "dark",
            "openAIKey": "sk-evil"
        }
    });
    let response =
        commands::import_data(hostile, ImportOptions::all(ImportMode::Merge), &state).await;
    assert!(response.success);

    assert_eq!(kv.get_json(CREDENTIAL_KEY), stored);
    let key = state
        .with_keyring(|k| k.get_api_key())
        .await
        .unwrap();
    assert_eq!(key.as_deref(), Some("sk-secret"));

    let settings = commands::get_settings(&state).await.data.unwrap();
    assert_eq!(settings.theme, Theme::Dark);
}

#[tokio::test]
async fn test_settings_merge_is_deep() {
    let (state, _temp) = test_state().await;
    let before = commands::get_settings(&state).await.data.unwrap();

    let document = json!({
        "settings": { "agentSettings": { "temperature": 1.2 } }
    });
    let options = ImportOptions {
        prompts: false,
        chats: false,
        settings: true,
        mode: ImportMode::Merge,
    };
    assert!(commands::import_data(document.clone(), options, &state).await.success);

    let after = commands::get_settings(&state).await.data.unwrap();
    assert_eq!(after.agent_settings.temperature, 1.2);
    assert_eq!(after.agent_settings.max_tokens, before.agent_settings.max_tokens);
    assert_eq!(after.theme, before.theme);
    assert_eq!(after.language, before.language);

    // A partial record is not enough to replace
    let replace = ImportOptions {
        mode: ImportMode::Replace,
        ..options
    };
    assert!(!commands::import_data(document, replace, &state).await.success);
}

#[tokio::test]
async fn test_each_import_gets_its_own_backup() {
    let (state, _temp) = test_state().await;
    let document = json!({ "prompts": [] });

    let first = commands::import_data(document.clone(), ImportOptions::all(ImportMode::Merge), &state)
        .await
        .data
        .unwrap();
    let second = commands::import_data(document, ImportOptions::all(ImportMode::Merge), &state)
        .await
        .data
        .unwrap();

    assert_ne!(first.backup_key, second.backup_key);
    let keys: Vec<_> = commands::list_backups(&state)
        .await
        .data
        .unwrap()
        .into_iter()
        .map(|b| b.key)
        .collect();
    assert!(keys.contains(&first.backup_key));
    assert!(keys.contains(&second.backup_key));

    let not_a_backup = commands::delete_backup("prompt-stash-prompts".to_string(), &state).await;
    assert!(!not_a_backup.success);
}

#[tokio::test]
async fn test_import_notifies_every_subscriber() {
    let (state, _temp) = test_state().await;
    let mut first = state.subscribe().await.unwrap();
    let mut second = state.subscribe().await.unwrap();

    let document = json!({ "prompts": [] });
    let options = ImportOptions {
        prompts: true,
        chats: false,
        settings: false,
        mode: ImportMode::Replace,
    };
    assert!(commands::import_data(document, options, &state).await.success);

    for rx in [&mut first, &mut second] {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&StoreEvent::Reloaded));
        assert!(events
            .iter()
            .any(|e| matches!(e, StoreEvent::Changed { key } if key == "prompt-stash-prompts")));
    }
}
