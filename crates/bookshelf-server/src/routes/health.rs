//! Health check endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when the database answers, "degraded" otherwise.
    pub status: &'static str,
    pub database: &'static str,
}

impl HealthResponse {
    fn from_ping(reachable: bool) -> (StatusCode, Self) {
        if reachable {
            (
                StatusCode::OK,
                Self {
                    status: "ok",
                    database: "ok",
                },
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Self {
                    status: "degraded",
                    database: "unreachable",
                },
            )
        }
    }
}

/// GET /health - Liveness plus a database round-trip.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let reachable = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let (status, body) = HealthResponse::from_ping(reachable);
    (status, Json(body))
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
