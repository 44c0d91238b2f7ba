//! Cross-Platform Path Utilities
//!
//! Functions for resolving the application data directory and the files kept
//! inside it (~/.prompt-stash/ by default).

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Environment variable that relocates the data directory
pub const HOME_ENV: &str = "PROMPT_STASH_HOME";

const DATA_DIR_NAME: &str = ".prompt-stash";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the default data directory (~/.prompt-stash/)
pub fn default_data_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(DATA_DIR_NAME))
}

/// Resolve the data directory.
///
/// Precedence: explicit override (the `--data-dir` flag), then
/// `PROMPT_STASH_HOME`, then `~/.prompt-stash`.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> AppResult<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    match std::env::var(HOME_ENV) {
        Ok(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir(),
    }
}

/// Get the config file path (<data dir>/config.json)
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

/// Get the database file path (<data dir>/data.db)
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data.db")
}

/// Get the credential encryption key path (<data dir>/secret.key)
pub fn secret_key_path(data_dir: &Path) -> PathBuf {
    data_dir.join("secret.key")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
