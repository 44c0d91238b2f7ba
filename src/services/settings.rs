//! Settings Service
//!
//! Reads and updates the `AppSettings` singleton.

use crate::models::settings::{AppSettings, SettingsPatch};
use crate::storage::kv::{KvStore, SETTINGS_KEY};
use crate::utils::error::{AppError, AppResult};

/// Service for the settings singleton
#[derive(Debug, Clone)]
pub struct SettingsService {
    kv: KvStore,
}

impl SettingsService {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Current settings (defaults when nothing is stored)
    pub fn get_settings(&self) -> AppSettings {
        self.kv.get(SETTINGS_KEY, AppSettings::default())
    }

    /// Apply a partial update and persist it
    pub fn update_settings(&self, patch: SettingsPatch) -> AppResult<AppSettings> {
        let mut settings = self.get_settings();
        settings.apply_patch(patch);
        settings.validate().map_err(AppError::validation)?;
        self.kv.set(SETTINGS_KEY, &settings);
        tracing::info!("updated settings");
        Ok(settings)
    }

    /// Restore defaults
    pub fn reset_settings(&self) -> AppSettings {
        let settings = AppSettings::default();
        self.kv.set(SETTINGS_KEY, &settings);
        tracing::info!("reset settings to defaults");
        settings
    }
}
