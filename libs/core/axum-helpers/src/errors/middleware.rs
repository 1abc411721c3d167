//! Centralized error rendering.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::Environment;

use super::{AppError, ErrorReport};

/// Settings for [`error_handler`]
#[derive(Debug, Clone, Copy)]
pub struct ErrorHandlerConfig {
    pub environment: Environment,
}

impl ErrorHandlerConfig {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn development() -> Self {
        Self::new(Environment::Development)
    }

    pub fn production() -> Self {
        Self::new(Environment::Production)
    }

    /// Follows `APP_ENV` / `NODE_ENV`
    pub fn from_env() -> Self {
        Self::new(Environment::from_env())
    }
}

impl Default for ErrorHandlerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Error-rendering middleware
///
/// Picks up the [`AppError`] behind any error response produced further down
/// the stack, logs it, and renders the body for the configured environment:
///
/// - development: `{status, message, error, errors, stack}`
/// - production, operational: `{status, message, errors?}`
/// - production, anything else: 500 `{status: "error", message: "Something went wrong!"}`
///
/// Install it as the outermost error layer so it also sees errors produced by
/// other middleware (authentication, panics caught by [`catch_async`](super::catch_async)).
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use axum_helpers::errors::{ErrorHandlerConfig, error_handler};
///
/// let app = Router::new()
///     .route("/orders", get(list_orders))
///     .layer(middleware::from_fn_with_state(ErrorHandlerConfig::from_env(), error_handler));
/// ```
pub async fn error_handler(
    State(config): State<ErrorHandlerConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorReport(error)) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    log_error(&error);

    if config.environment.is_development() {
        (error.status_code(), Json(error.development_body())).into_response()
    } else {
        (error.response_status(), Json(error.production_body())).into_response()
    }
}

fn log_error(error: &AppError) {
    if error.response_status().is_server_error() {
        tracing::error!(
            error = %error,
            status_code = error.status_code().as_u16(),
            errors = ?error.errors(),
            detail = ?error.detail(),
            operational = error.is_operational(),
            span_trace = %error.span_trace(),
            "Request failed"
        );
    } else {
        tracing::warn!(
            error = %error,
            status_code = error.status_code().as_u16(),
            errors = ?error.errors(),
            "Request rejected"
        );
    }
}
