//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of all backend services
pub async fn get_health(state: &AppState) -> CommandResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    // Check database health
    health.database = state.is_database_healthy();

    // Check credential store health
    health.keyring = state.is_keyring_healthy();

    // Check config health
    health.config = state.is_config_healthy();

    health.api_key_configured = state
        .with_keyring(|k| Ok(k.has_api_key()))
        .await
        .unwrap_or(false);

    // Overall status
    health.status = if health.database && health.keyring && health.config {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    CommandResponse::ok(health)
}
