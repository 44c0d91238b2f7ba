//! Transfer Commands
//!
//! Command handlers for snapshot export/import and backups.

use crate::models::export::{
    BackupSnapshot, BackupSummary, ExportDocument, ExportOptions, ImportOptions, ImportReport,
};
use crate::models::response::CommandResponse;
use crate::services::transfer::TransferService;
use crate::state::AppState;

/// Export the selected collections
pub async fn export_data(options: ExportOptions, state: &AppState) -> CommandResponse<ExportDocument> {
    state
        .with_store(|kv| TransferService::new(kv.clone()).export_selective(options))
        .await
        .into()
}

/// Import the selected collections of a snapshot document
pub async fn import_data(
    document: serde_json::Value,
    options: ImportOptions,
    state: &AppState,
) -> CommandResponse<ImportReport> {
    state
        .with_store(|kv| TransferService::new(kv.clone()).import_selective(&document, options))
        .await
        .into()
}

/// List stored backups
pub async fn list_backups(state: &AppState) -> CommandResponse<Vec<BackupSummary>> {
    state
        .with_store(|kv| Ok(TransferService::new(kv.clone()).list_backups()))
        .await
        .into()
}

/// Read a backup
pub async fn get_backup(key: String, state: &AppState) -> CommandResponse<BackupSnapshot> {
    state
        .with_store(|kv| TransferService::new(kv.clone()).get_backup(&key))
        .await
        .into()
}

/// Delete a backup
pub async fn delete_backup(key: String, state: &AppState) -> CommandResponse<()> {
    state
        .with_store(|kv| TransferService::new(kv.clone()).delete_backup(&key))
        .await
        .into()
}
