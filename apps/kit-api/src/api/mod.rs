use axum::{Router, middleware};
use axum_helpers::require_auth;

use crate::state::AppState;

mod health;
mod notes;
mod profile;

/// Health checks are public; everything else sits behind `require_auth`.
pub fn routes(state: &AppState) -> Router {
    let protected = Router::new()
        .merge(profile::router())
        .merge(notes::router(state.clone()))
        .route_layer(middleware::from_fn_with_state(
            state.config.auth.clone(),
            require_auth,
        ));

    Router::new()
        .merge(health::router(state.clone()))
        .merge(protected)
}
