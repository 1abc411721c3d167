use crate::errors::{ErrorHandlerConfig, catch_async, error_handler, not_found};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

/// Starts the Axum server and stops accepting requests once `shutdown`
/// resolves; in-flight requests are allowed to finish.
///
/// # Errors
/// Returns an error if:
/// - The TCP listener fails to bind to the configured address
/// - The server encounters an error during operation
///
/// # Example
/// ```ignore
/// use axum_helpers::server::{create_app, shutdown_signal};
/// use core_config::server::ServerConfig;
///
/// create_app(router, &ServerConfig::default(), shutdown_signal()).await?;
/// ```
pub async fn create_app<F>(router: Router, server_config: &ServerConfig, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Wraps API routes with the shared error and tracing stack.
///
/// - routes nested under `/api`
/// - unmatched paths answered by [`not_found`]
/// - panics turned into errors by [`catch_async`]
/// - every error rendered by [`error_handler`] for the configured environment
/// - request spans and response logging at `INFO`
///
/// # Example
/// ```ignore
/// let api_routes = Router::new()
///     .route("/orders", get(list_orders))
///     .with_state(state);
///
/// let router = create_router(api_routes, ErrorHandlerConfig::from_env());
/// ```
pub fn create_router(apis: Router, error_config: ErrorHandlerConfig) -> Router {
    Router::new()
        .nest("/api", apis)
        .fallback(not_found)
        .layer(catch_async())
        .layer(middleware::from_fn_with_state(error_config, error_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn teapot() -> Result<&'static str, AppError> {
        Err(AppError::new("I'm a teapot", StatusCode::IM_A_TEAPOT))
    }

    async fn body(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_route_is_rendered_not_found() {
        let router = create_router(Router::new(), ErrorHandlerConfig::production());
        let (status, json) = body(router, "/nowhere").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "fail");
        assert_eq!(json["message"], "Requested resource was not found.");
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let apis = Router::new().route("/teapot", get(teapot));
        let router = create_router(apis, ErrorHandlerConfig::production());
        let (status, json) = body(router, "/api/teapot").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(json["message"], "I'm a teapot");
    }
}
