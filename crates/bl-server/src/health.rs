//! Liveness and readiness endpoints
//!
//! Readiness pings the database when a pool is configured; in development
//! mode (in-memory store) it reports ready unconditionally.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use bl_db::Database;

#[derive(Clone)]
pub struct HealthState {
    db: Option<Database>,
}

pub fn router(db: Option<Database>) -> Router {
    Router::new()
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .with_state(HealthState { db })
}

async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness(
    State(state): State<HealthState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match &state.db {
        None => Ok(Json(json!({ "status": "ready", "database": "none" }))),
        Some(db) => match db.ping().await {
            Ok(()) => Ok(Json(json!({ "status": "ready", "database": "ok" }))),
            Err(e) => {
                tracing::warn!("readiness check failed: {}", e);
                Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "not ready", "database": "unreachable" })),
                ))
            }
        },
    }
}
