//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Pool probe result: "ok" or "unavailable"
    pub database: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    let database = match db::query(sqlx::query("SELECT 1")).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Database probe failed: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Health routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
