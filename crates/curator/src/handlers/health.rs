//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Cache gateway failure counter (passive, never touches a gateway)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStats {
    pub status: &'static str,
    /// Cache calls that failed or timed out since startup and were served from the store.
    pub cache_unavailable: u64,
}

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Passive stats.
///
/// Cache outages degrade to store reads rather than failing requests, so the
/// service reports `ok` either way; the counter shows whether that is happening.
pub async fn healthz(State(state): State<AppState>) -> Json<HealthStats> {
    Json(HealthStats {
        status: "ok",
        cache_unavailable: state.cache.unavailable_count(),
    })
}
