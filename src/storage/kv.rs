//! Key-Value Persistence Adapter
//!
//! Typed JSON access on top of [`Database`]. Plain reads never fail (a missing
//! key, corrupt JSON or an unavailable backend all yield the caller's default)
//! and writes never surface errors; both are logged instead. [`KvStore::try_get`]
//! is the strict variant for callers that must not mistake corrupt data for an
//! empty collection.
//!
//! Every successful write publishes a [`StoreEvent`] so that any number of
//! views can stay in sync with the same store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use super::database::Database;
use crate::utils::error::{AppError, AppResult};

/// Store key holding `Prompt[]`
pub const PROMPTS_KEY: &str = "prompt-stash-prompts";
/// Store key holding `Chat[]`
pub const CHATS_KEY: &str = "prompt-stash-chats";
/// Store key holding `AppSettings`
pub const SETTINGS_KEY: &str = "prompt-stash-settings";
/// Store key holding the encrypted API credential
pub const CREDENTIAL_KEY: &str = "prompt-stash-openai-key";
/// Prefix of backup snapshot keys
pub const BACKUP_PREFIX: &str = "backup-";

const EVENT_CAPACITY: usize = 64;

/// Change notification published after a store mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A key was written
    Changed { key: String },
    /// A key was removed
    Removed { key: String },
    /// Several collections were replaced at once (after an import)
    Reloaded,
}

/// Shared handle to the key-value store
#[derive(Debug, Clone)]
pub struct KvStore {
    db: Database,
    events: broadcast::Sender<StoreEvent>,
}

impl KvStore {
    pub fn new(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { db, events }
    }

    /// Underlying database (health checks only)
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Read and deserialize `key`, falling back to `default`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.db.get_value(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "corrupt value in store, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, using default");
                default
            }
        }
    }

    /// Read and deserialize `key`; a missing key is `Ok(None)`.
    ///
    /// Unlike [`KvStore::get`], corrupt data and backend failures are errors.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.db.get_value(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::corrupt_store(key, e.to_string())),
            None => Ok(None),
        }
    }

    /// Read `key` as untyped JSON.
    pub fn get_json(&self, key: &str) -> Option<Value> {
        self.get::<Option<Value>>(key, None)
    }

    /// Read `key` verbatim: parsed JSON, or the stored text when it is not
    /// JSON. Missing keys and backend failures read as null.
    pub fn get_raw(&self, key: &str) -> Value {
        match self.db.get_value(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(_) => Value::String(raw),
            },
            Ok(None) => Value::Null,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed");
                Value::Null
            }
        }
    }

    /// Serialize and write `value` under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize value for store");
                return;
            }
        };
        match self.db.set_value(key, &raw) {
            Ok(()) => self.publish(StoreEvent::Changed {
                key: key.to_string(),
            }),
            Err(e) => tracing::error!(key, error = %e, "store write failed"),
        }
    }

    /// Delete `key` unconditionally.
    pub fn remove(&self, key: &str) {
        match self.db.delete_value(key) {
            Ok(()) => self.publish(StoreEvent::Removed {
                key: key.to_string(),
            }),
            Err(e) => tracing::error!(key, error = %e, "store delete failed"),
        }
    }

    /// Whether `key` currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        match self.db.get_value(key) {
            Ok(value) => value.is_some(),
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed");
                false
            }
        }
    }

    /// Keys starting with `prefix`, sorted ascending.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.db.keys_with_prefix(prefix).unwrap_or_else(|e| {
            tracing::warn!(prefix, error = %e, "store key listing failed");
            Vec::new()
        })
    }

    /// Observe store mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Publish an event; having no subscribers is not an error.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> KvStore {
        KvStore::new(Database::new_in_memory().unwrap())
    }

    #[test]
    fn test_missing_key_returns_default() {
        let kv = store();
        let value: Vec<String> = kv.get("nothing-here", vec!["fallback".to_string()]);
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[test]
    fn test_corrupt_json_returns_default() {
        let kv = store();
        kv.database().set_value(PROMPTS_KEY, "{not json").unwrap();
        let value: Vec<u32> = kv.get(PROMPTS_KEY, Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_wrong_shape_returns_default() {
        let kv = store();
        kv.set(SETTINGS_KEY, &serde_json::json!({"theme": 3}));
        let value: Vec<u32> = kv.get(SETTINGS_KEY, vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn test_try_get_reports_corruption() {
        let kv = store();
        assert!(kv.try_get::<Vec<u32>>(PROMPTS_KEY).unwrap().is_none());

        kv.set(PROMPTS_KEY, &serde_json::json!([1, 2.5]));
        let err = kv.try_get::<Vec<u32>>(PROMPTS_KEY).unwrap_err();
        assert!(matches!(err, AppError::CorruptStore { ref key, .. } if key == PROMPTS_KEY));

        kv.set(PROMPTS_KEY, &vec![1u32, 2]);
        assert_eq!(kv.try_get::<Vec<u32>>(PROMPTS_KEY).unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_get_raw_keeps_unparseable_text() {
        let kv = store();
        assert_eq!(kv.get_raw(CHATS_KEY), Value::Null);

        kv.database().set_value(CHATS_KEY, "{not json").unwrap();
        assert_eq!(kv.get_raw(CHATS_KEY), Value::String("{not json".to_string()));

        kv.set(CHATS_KEY, &serde_json::json!([{"rating": 4.5}]));
        assert_eq!(kv.get_raw(CHATS_KEY), serde_json::json!([{"rating": 4.5}]));
    }

    #[test]
    fn test_set_get_remove() {
        let kv = store();
        kv.set("numbers", &vec![1, 2, 3]);
        assert!(kv.contains("numbers"));
        assert_eq!(kv.get::<Vec<i32>>("numbers", vec![]), vec![1, 2, 3]);

        kv.remove("numbers");
        assert!(!kv.contains("numbers"));
        assert!(kv.get_json("numbers").is_none());
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let kv = store();
        kv.set("k", &1);
        kv.publish(StoreEvent::Reloaded);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_changes() {
        let kv = store();
        let mut first = kv.subscribe();
        let mut second = kv.clone().subscribe();

        kv.set("k", &"v");
        kv.remove("k");

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                StoreEvent::Changed {
                    key: "k".to_string()
                }
            );
            assert_eq!(
                rx.recv().await.unwrap(),
                StoreEvent::Removed {
                    key: "k".to_string()
                }
            );
        }
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&StoreEvent::Reloaded).unwrap();
        assert_eq!(json, r#"{"type":"reloaded"}"#);
    }
}
