//! Settings Models
//!
//! User-facing application settings (part of exported snapshots).

use serde::{Deserialize, Serialize};

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Options passed to the chat model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    pub enable_actions: bool,
    pub tools: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            enable_actions: false,
            tools: Vec::new(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

/// Application settings singleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    /// Language code (e.g., "en", "zh")
    pub language: String,
    pub auto_save: bool,
    pub agent_settings: AgentSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
            auto_save: true,
            agent_settings: AgentSettings::default(),
        }
    }
}

/// Partial agent settings update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettingsPatch {
    pub enable_actions: Option<bool>,
    pub tools: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Partial settings update; also the shape accepted by a merge import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub auto_save: Option<bool>,
    pub agent_settings: Option<AgentSettingsPatch>,
}

impl AppSettings {
    /// Apply a partial update; `agentSettings` is merged field by field
    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(auto_save) = patch.auto_save {
            self.auto_save = auto_save;
        }
        if let Some(agent) = patch.agent_settings {
            if let Some(enable_actions) = agent.enable_actions {
                self.agent_settings.enable_actions = enable_actions;
            }
            if let Some(tools) = agent.tools {
                self.agent_settings.tools = tools;
            }
            if let Some(temperature) = agent.temperature {
                self.agent_settings.temperature = temperature;
            }
            if let Some(max_tokens) = agent.max_tokens {
                self.agent_settings.max_tokens = max_tokens;
            }
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        // Validate language (basic check)
        if self.language.len() < 2 || self.language.len() > 5 {
            return Err(format!("Invalid language code: {}", self.language));
        }

        let temperature = self.agent_settings.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(format!(
                "temperature must be between 0 and 2, got {}",
                temperature
            ));
        }

        if self.agent_settings.max_tokens == 0 {
            return Err("maxTokens must be greater than 0".to_string());
        }

        Ok(())
    }
}
