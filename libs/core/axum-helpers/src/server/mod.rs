//! Server infrastructure module.
//!
//! This module provides:
//! - Router setup with the shared error and tracing layers
//! - Serving with graceful shutdown
//! - Termination signal handling
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, shutdown_signal};
//! use axum_helpers::errors::ErrorHandlerConfig;
//! use core_config::server::ServerConfig;
//!
//! let router = create_router(api_routes, ErrorHandlerConfig::from_env());
//! create_app(router, &ServerConfig::default(), shutdown_signal()).await?;
//! ```

pub mod app;
pub mod shutdown;

pub use app::{create_app, create_router};
pub use shutdown::shutdown_signal;
