//! Application State
//!
//! Owns the store, credential and config services. Initialized once per
//! process; commands borrow services through the `with_*` helpers.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::storage::{
    ConfigService, Database, KeyringService, KvStore, RuntimeConfig, StoreEvent,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{database_path, ensure_dir, secret_key_path};
use prompt_stash_llm::{OpenAIProvider, ProviderConfig};

/// Application state shared by all commands
pub struct AppState {
    /// Typed key-value store over SQLite
    store: Arc<RwLock<Option<KvStore>>>,
    /// Encrypted credential storage
    keyring: Arc<RwLock<Option<KeyringService>>>,
    /// Runtime configuration (config.json + environment)
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(None)),
            keyring: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services from files under `data_dir`
    pub async fn initialize(&self, data_dir: &Path) -> AppResult<()> {
        ensure_dir(data_dir)?;
        let db = Database::open(&database_path(data_dir))?;
        self.initialize_with(db, data_dir).await
    }

    /// Initialize with an already opened database (in-memory for tests)
    pub async fn initialize_with(&self, db: Database, data_dir: &Path) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let config = ConfigService::load(data_dir)?;
        let kv = KvStore::new(db);

        {
            let keyring = KeyringService::new(kv.clone(), secret_key_path(data_dir));
            let mut keyring_lock = self.keyring.write().await;
            *keyring_lock = Some(keyring);
        }

        {
            let mut store_lock = self.store.write().await;
            *store_lock = Some(kv);
        }

        {
            let mut config_lock = self.config.write().await;
            *config_lock = Some(config);
        }

        *initialized = true;
        tracing::info!(data_dir = %data_dir.display(), "application state initialized");
        Ok(())
    }

    /// Check if the database is healthy
    pub fn is_database_healthy(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.store.try_read() {
            if let Some(ref kv) = *guard {
                return kv.database().is_healthy();
            }
        }
        false
    }

    /// Check if the credential store is healthy
    pub fn is_keyring_healthy(&self) -> bool {
        if let Ok(guard) = self.keyring.try_read() {
            if let Some(ref keyring) = *guard {
                return keyring.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Get the current runtime configuration
    pub async fn get_config(&self) -> AppResult<RuntimeConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config().clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Get store access for synchronous operations
    pub async fn with_store<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&KvStore) -> AppResult<T>,
    {
        let guard = self.store.read().await;
        match &*guard {
            Some(kv) => f(kv),
            None => Err(AppError::database("Store not initialized")),
        }
    }

    /// Clone the store handle (for operations that await)
    pub async fn store(&self) -> AppResult<KvStore> {
        self.with_store(|kv| Ok(kv.clone())).await
    }

    /// Observe store changes
    pub async fn subscribe(&self) -> AppResult<broadcast::Receiver<StoreEvent>> {
        self.with_store(|kv| Ok(kv.subscribe())).await
    }

    /// Get credential store access
    pub async fn with_keyring<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&KeyringService) -> AppResult<T>,
    {
        let guard = self.keyring.read().await;
        match &*guard {
            Some(keyring) => f(keyring),
            None => Err(AppError::keyring("Keyring service not initialized")),
        }
    }

    /// Build the chat client from the runtime config and stored API key
    pub async fn chat_provider(&self) -> AppResult<OpenAIProvider> {
        let config = self.get_config().await?;
        let api_key = self.with_keyring(|k| k.get_api_key()).await?;
        let provider = OpenAIProvider::new(ProviderConfig {
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            timeout: config.request_timeout(),
            ..Default::default()
        })?;
        Ok(provider)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
