//! Health check endpoints

use axum::{Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{ApiResponse, send_error, send_success};
use database::mongodb::ConnectionStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/db", get(database_health))
        .with_state(state)
}

/// Liveness - the process is up and serving
async fn liveness() -> ApiResponse<Liveness> {
    send_success(Liveness { status: "ok" })
}

/// Readiness - reports the managed connection, 503 unless it is confirmed up
async fn database_health(State(state): State<AppState>) -> ApiResponse<ConnectionStatus> {
    let status = state.manager.status();

    if status.is_healthy() {
        send_success(status)
    } else {
        send_error("Database unavailable.")
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .data(status)
    }
}
