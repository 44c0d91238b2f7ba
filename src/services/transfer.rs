//! Snapshot Transfer Service
//!
//! Selective export, selective import (merge or replace) and the backup
//! snapshots written before every import.
//!
//! Import order: backup, then validate every requested collection and combine
//! it with the local one, then write. A malformed incoming collection, or a
//! local collection that no longer reads as its model during a merge, aborts
//! the import before anything is written. Individual store writes are not
//! transactional across keys; a failing write is logged by the store and the
//! remaining collections are still written.
//!
//! Backups hold the stored values verbatim so that nothing unreadable is
//! dropped on the way into a snapshot.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::chat::Chat;
use crate::models::export::{
    BackupSnapshot, BackupSummary, Collection, ExportDocument, ExportOptions, ImportMode,
    ImportOptions, ImportReport, APP_NAME, EXPORT_VERSION,
};
use crate::models::prompt::Prompt;
use crate::models::settings::{AppSettings, SettingsPatch};
use crate::storage::kv::{
    KvStore, StoreEvent, BACKUP_PREFIX, CHATS_KEY, CREDENTIAL_KEY, PROMPTS_KEY, SETTINGS_KEY,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::now_iso;
use prompt_stash_core::{dedupe_tags, CoreResult};

/// Field names that could carry the API credential in a foreign document
const CREDENTIAL_FIELDS: &[&str] = &["apiKey", "openAIKey", "openaiKey", CREDENTIAL_KEY];

/// Collections that passed validation, combined with local data and ready
/// to be written
#[derive(Debug, Default)]
struct ValidatedImport {
    prompts: Option<Vec<Prompt>>,
    chats: Option<Vec<Chat>>,
    settings: Option<AppSettings>,
}

/// Service for exporting, importing and backing up the library
#[derive(Debug, Clone)]
pub struct TransferService {
    kv: KvStore,
}

impl TransferService {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Build a snapshot containing only the selected collections
    pub fn export_selective(&self, options: ExportOptions) -> AppResult<ExportDocument> {
        if options.is_empty() {
            return Err(AppError::validation(
                "select at least one collection to export",
            ));
        }

        let document = ExportDocument {
            exported_at: now_iso(),
            version: EXPORT_VERSION.to_string(),
            app_name: APP_NAME.to_string(),
            prompts: options
                .prompts
                .then(|| self.kv.get(PROMPTS_KEY, Vec::new())),
            chats: options.chats.then(|| self.kv.get(CHATS_KEY, Vec::new())),
            settings: options
                .settings
                .then(|| self.kv.get(SETTINGS_KEY, AppSettings::default())),
        };

        tracing::info!(
            prompts = document.prompts.as_ref().map_or(0, Vec::len),
            chats = document.chats.as_ref().map_or(0, Vec::len),
            settings = document.settings.is_some(),
            "exported snapshot"
        );
        Ok(document)
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Import the selected collections of `document`.
    ///
    /// A backup of the current state is written first, whatever the outcome.
    pub fn import_selective(
        &self,
        document: &Value,
        options: ImportOptions,
    ) -> AppResult<ImportReport> {
        let backup_key = self.write_backup();

        let Some(fields) = document.as_object() else {
            return Err(AppError::invalid_format(format!(
                "expected a JSON object, found {}",
                json_kind(document)
            )));
        };
        warn_on_credentials(fields, "document");

        let mut validated = ValidatedImport::default();
        let mut skipped = Vec::new();

        for collection in Collection::ALL {
            if !options.includes(collection) {
                continue;
            }
            let raw = match fields.get(collection.as_str()) {
                Some(value) if !value.is_null() => value,
                _ => {
                    skipped.push(collection);
                    continue;
                }
            };
            match collection {
                Collection::Prompts => {
                    let mut incoming = parse_records(collection, raw, Prompt::validate)?;
                    for prompt in &mut incoming {
                        prompt.tags = dedupe_tags(&prompt.tags);
                    }
                    validated.prompts = Some(self.combine(
                        PROMPTS_KEY,
                        incoming,
                        options.mode,
                        |p: &Prompt| p.id.as_str(),
                    )?);
                }
                Collection::Chats => {
                    let incoming = parse_records(collection, raw, Chat::validate)?;
                    validated.chats = Some(self.combine(
                        CHATS_KEY,
                        incoming,
                        options.mode,
                        |c: &Chat| c.id.as_str(),
                    )?);
                }
                Collection::Settings => {
                    validated.settings = Some(self.parse_settings(raw, options.mode)?);
                }
            }
        }

        let mut imported = Vec::new();
        if let Some(prompts) = validated.prompts {
            self.kv.set(PROMPTS_KEY, &prompts);
            imported.push(Collection::Prompts);
        }
        if let Some(chats) = validated.chats {
            self.kv.set(CHATS_KEY, &chats);
            imported.push(Collection::Chats);
        }
        if let Some(settings) = validated.settings {
            self.kv.set(SETTINGS_KEY, &settings);
            imported.push(Collection::Settings);
        }

        self.kv.publish(StoreEvent::Reloaded);
        tracing::info!(
            backup = %backup_key,
            mode = ?options.mode,
            imported = ?imported,
            skipped = ?skipped,
            "import finished"
        );

        Ok(ImportReport {
            backup_key,
            imported,
            skipped,
        })
    }

    /// Replace keeps `incoming`; merge folds it into the stored collection,
    /// which must still deserialize.
    fn combine<T, F>(
        &self,
        key: &str,
        incoming: Vec<T>,
        mode: ImportMode,
        id_of: F,
    ) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> &str,
    {
        match mode {
            ImportMode::Replace => Ok(incoming),
            ImportMode::Merge => {
                let local = self.kv.try_get::<Vec<T>>(key)?.unwrap_or_default();
                Ok(merge_by_id(local, incoming, id_of))
            }
        }
    }

    /// Replace needs a complete record; merge applies the fields present
    fn parse_settings(&self, raw: &Value, mode: ImportMode) -> AppResult<AppSettings> {
        let collection = Collection::Settings;
        let fields = raw
            .as_object()
            .ok_or_else(|| AppError::malformed(collection.as_str(), "expected an object"))?;
        warn_on_credentials(fields, "settings");

        let settings = match mode {
            ImportMode::Replace => serde_json::from_value::<AppSettings>(raw.clone())
                .map_err(|e| AppError::malformed(collection.as_str(), e.to_string()))?,
            ImportMode::Merge => {
                let patch = serde_json::from_value::<SettingsPatch>(raw.clone())
                    .map_err(|e| AppError::malformed(collection.as_str(), e.to_string()))?;
                let mut current = self
                    .kv
                    .try_get::<AppSettings>(SETTINGS_KEY)?
                    .unwrap_or_default();
                current.apply_patch(patch);
                current
            }
        };
        settings
            .validate()
            .map_err(|reason| AppError::malformed(collection.as_str(), reason))?;
        Ok(settings)
    }

    // ========================================================================
    // Backups
    // ========================================================================

    /// Snapshot the current state under a fresh `backup-*` key
    pub fn write_backup(&self) -> String {
        self.write_backup_at(now_iso())
    }

    fn write_backup_at(&self, created_at: String) -> String {
        let base = format!("{}{}", BACKUP_PREFIX, created_at);
        let mut key = base.clone();
        let mut suffix = 0u32;
        while self.kv.contains(&key) {
            suffix += 1;
            key = format!("{}-{}", base, suffix);
        }

        let snapshot = BackupSnapshot {
            created_at,
            prompts: self.kv.get_raw(PROMPTS_KEY),
            chats: self.kv.get_raw(CHATS_KEY),
            settings: self.kv.get_raw(SETTINGS_KEY),
        };
        self.kv.set(&key, &snapshot);
        tracing::info!(
            key = %key,
            prompts = record_count(&snapshot.prompts),
            chats = record_count(&snapshot.chats),
            "wrote backup"
        );
        key
    }

    /// All readable backups, oldest first
    pub fn list_backups(&self) -> Vec<BackupSummary> {
        let mut backups: Vec<(u32, BackupSummary)> = self
            .kv
            .keys_with_prefix(BACKUP_PREFIX)
            .into_iter()
            .filter_map(|key| {
                let snapshot = self.kv.get::<Option<BackupSnapshot>>(&key, None)?;
                let collision = collision_suffix(&key, &snapshot.created_at);
                Some((
                    collision,
                    BackupSummary {
                        prompt_count: record_count(&snapshot.prompts),
                        chat_count: record_count(&snapshot.chats),
                        created_at: snapshot.created_at,
                        key,
                    },
                ))
            })
            .collect();
        backups.sort_by(|(a_suffix, a), (b_suffix, b)| {
            a.created_at
                .cmp(&b.created_at)
                .then(a_suffix.cmp(b_suffix))
        });
        backups.into_iter().map(|(_, summary)| summary).collect()
    }

    /// Read a backup back for manual recovery
    pub fn get_backup(&self, key: &str) -> AppResult<BackupSnapshot> {
        check_backup_key(key)?;
        self.kv
            .get::<Option<BackupSnapshot>>(key, None)
            .ok_or_else(|| AppError::not_found(format!("backup {}", key)))
    }

    /// Explicitly delete a backup
    pub fn delete_backup(&self, key: &str) -> AppResult<()> {
        check_backup_key(key)?;
        if !self.kv.contains(key) {
            return Err(AppError::not_found(format!("backup {}", key)));
        }
        self.kv.remove(key);
        tracing::info!(key, "deleted backup");
        Ok(())
    }
}

/// `prompt-stash-<suffix>-<YYYY-MM-DD>.json`
pub fn export_filename(options: ExportOptions, date: NaiveDate) -> AppResult<String> {
    if options.is_empty() {
        return Err(AppError::validation(
            "select at least one collection to export",
        ));
    }
    let suffix = if options.is_all() {
        "all-data".to_string()
    } else {
        let labels: Vec<&str> = options.selected().iter().map(|c| c.label()).collect();
        labels
            .join(" + ")
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    };
    Ok(format!(
        "prompt-stash-{}-{}.json",
        suffix,
        date.format("%Y-%m-%d")
    ))
}

/// Parse an import file, mapping non-JSON input to `InvalidFormat`
pub fn parse_document(text: &str) -> AppResult<Value> {
    serde_json::from_str(text).map_err(|e| AppError::invalid_format(format!("not JSON: {}", e)))
}

fn parse_records<T, V>(collection: Collection, raw: &Value, validate: V) -> AppResult<Vec<T>>
where
    T: DeserializeOwned,
    V: Fn(&T) -> CoreResult<()>,
{
    let records: Vec<T> = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::malformed(collection.as_str(), e.to_string()))?;
    for (index, record) in records.iter().enumerate() {
        validate(record).map_err(|e| {
            AppError::malformed(collection.as_str(), format!("record {}: {}", index, e))
        })?;
    }
    Ok(records)
}

/// Overwrite records with a matching id in place; append the rest in order
fn merge_by_id<T, F>(mut local: Vec<T>, incoming: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    for record in incoming {
        match local.iter().position(|existing| id_of(existing) == id_of(&record)) {
            Some(index) => local[index] = record,
            None => local.push(record),
        }
    }
    local
}

/// `N` for a key written as `backup-<created_at>-N`, 0 otherwise
fn collision_suffix(key: &str, created_at: &str) -> u32 {
    key.strip_prefix(BACKUP_PREFIX)
        .and_then(|rest| rest.strip_prefix(created_at))
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn record_count(collection: &Value) -> usize {
    collection.as_array().map_or(0, Vec::len)
}

fn warn_on_credentials(fields: &Map<String, Value>, scope: &str) {
    for name in CREDENTIAL_FIELDS {
        if fields.contains_key(*name) {
            tracing::warn!(field = *name, scope, "ignoring credential field in import");
        }
    }
}

fn check_backup_key(key: &str) -> AppResult<()> {
    if !key.starts_with(BACKUP_PREFIX) {
        return Err(AppError::validation(format!(
            "'{}' is not a backup key",
            key
        )));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
