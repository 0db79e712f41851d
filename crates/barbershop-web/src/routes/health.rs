//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Health check endpoint. Answers 503 when the database cannot be queried.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match database::barber::count_barbers(state.db.pool()).await {
        Ok(_) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable",
                }),
            )
        }
    }
}
