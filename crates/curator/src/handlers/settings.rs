use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use curator_core::records::{validate_setting, PutSettingRequest, Setting};
use curator_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

/// List every setting (GET /api/settings).
pub async fn list_settings(State(state): State<AppState>) -> Result<Json<Vec<Setting>>, AppError> {
    Ok(Json(state.settings.list_settings().await?))
}

/// Get a setting by key (GET /api/settings/{key}).
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    let setting = state
        .settings
        .get_setting(&key)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Setting", &key))?;

    Ok(Json(setting))
}

/// Create or replace a setting (PUT /api/settings/{key}).
pub async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<PutSettingRequest>,
) -> Result<Json<Setting>, AppError> {
    let setting = payload.into_setting(key.trim());
    validate_setting(&setting).map_err(RepositoryError::from)?;

    let stored = state.settings.put_setting(&setting).await?;

    tracing::info!(key = %stored.key, "Stored setting");

    Ok(Json(stored))
}

/// Delete a setting (DELETE /api/settings/{key}).
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    state.settings.delete_setting(&key).await?;

    tracing::info!(key = %key, "Deleted setting");

    Ok(StatusCode::NO_CONTENT)
}
