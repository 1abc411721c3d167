//! # Axum Helpers
//!
//! Utilities and middleware for Axum web services.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError`, centralized error rendering, panic catching
//! - **[`response`]**: success / error JSON envelopes
//! - **[`auth`]**: JWT bearer-token middleware
//! - **[`extractors`]**: validated JSON
//! - **[`server`]**: router setup, serving, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use axum_helpers::{ErrorHandlerConfig, create_app, create_router, send_success, shutdown_signal};
//! use core_config::server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let api_routes = Router::new().route("/ping", get(|| async { send_success("pong") }));
//!     let router = create_router(api_routes, ErrorHandlerConfig::from_env());
//!
//!     create_app(router, &ServerConfig::default(), shutdown_signal()).await
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod response;
pub mod server;

// Re-export auth types
pub use auth::{AuthOptions, AuthenticatedUser, require_auth};

// Re-export server types
pub use server::{create_app, create_router, shutdown_signal};

// Re-export error types
pub use errors::{
    AppError, ErrorHandlerConfig, ErrorReport, ErrorResponse, catch_async, error_handler,
};

// Re-export response helpers
pub use response::{ApiResponse, send_error, send_success};

// Re-export extractors
pub use extractors::ValidatedJson;
