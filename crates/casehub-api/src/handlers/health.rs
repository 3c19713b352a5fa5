//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let storage_ok = match state.storage.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let (database, database_ok) = match &state.db_pool {
        None => ("memory", true),
        Some(pool) => match pool.health_check().await {
            Ok(true) => ("connected", true),
            Ok(false) => ("unavailable", false),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                ("unavailable", false)
            }
        },
    };

    let status = if storage_ok && database_ok { "ok" } else { "degraded" };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        storage: if storage_ok { "available" } else { "unavailable" }.to_string(),
    }))
}
