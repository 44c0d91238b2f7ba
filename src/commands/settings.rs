//! Settings Commands
//!
//! Command handlers for application settings and the API credential.

use crate::models::response::CommandResponse;
use crate::models::settings::{AppSettings, SettingsPatch};
use crate::services::settings::SettingsService;
use crate::state::AppState;

/// Get current settings
pub async fn get_settings(state: &AppState) -> CommandResponse<AppSettings> {
    state
        .with_store(|kv| Ok(SettingsService::new(kv.clone()).get_settings()))
        .await
        .into()
}

/// Apply a partial settings update
pub async fn update_settings(patch: SettingsPatch, state: &AppState) -> CommandResponse<AppSettings> {
    state
        .with_store(|kv| SettingsService::new(kv.clone()).update_settings(patch))
        .await
        .into()
}

/// Restore default settings
pub async fn reset_settings(state: &AppState) -> CommandResponse<AppSettings> {
    state
        .with_store(|kv| Ok(SettingsService::new(kv.clone()).reset_settings()))
        .await
        .into()
}

/// Store the chat API key (encrypted)
pub async fn set_api_key(key: String, state: &AppState) -> CommandResponse<()> {
    state.with_keyring(|k| k.set_api_key(&key)).await.into()
}

/// Remove the chat API key
pub async fn clear_api_key(state: &AppState) -> CommandResponse<()> {
    state
        .with_keyring(|k| {
            k.delete_api_key();
            Ok(())
        })
        .await
        .into()
}

/// Whether an API key is stored
pub async fn get_api_key_status(state: &AppState) -> CommandResponse<bool> {
    state.with_keyring(|k| Ok(k.has_api_key())).await.into()
}
