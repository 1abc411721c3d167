use axum::{Router, routing::get};
use axum_helpers::{ApiResponse, AuthenticatedUser, send_success};
use serde_json::Value;

pub fn router() -> Router {
    Router::new().route("/me", get(me))
}

/// Echo the verified token claims
async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> ApiResponse<Value> {
    send_success(claims)
}
