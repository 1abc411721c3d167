use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use super::AppError;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer that turns a panicking handler into an error response.
///
/// Handlers returning `Result<_, AppError>` already propagate failures with
/// `?`; this covers the ones that blow up instead. The panic becomes a
/// non-operational [`AppError`] carrying the panic message, which
/// [`error_handler`](super::error_handler) then renders like any other.
///
/// Add it *inside* the error handler:
///
/// ```ignore
/// let app = Router::new()
///     .route("/reports", get(build_report))
///     .layer(catch_async())
///     .layer(middleware::from_fn_with_state(config, error_handler));
/// ```
pub fn catch_async() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(panic = %message, "Handler panicked");
    AppError::unexpected(message).into_response()
}
