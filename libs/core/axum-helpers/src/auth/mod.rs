//! Bearer-token authentication.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{AuthOptions, AuthenticatedUser, require_auth};
//! use core_config::FromEnv;
//!
//! let protected = Router::new()
//!     .route("/api/me", get(|user: AuthenticatedUser| async move { Json(user.0) }))
//!     .layer(axum::middleware::from_fn_with_state(AuthOptions::from_env()?, require_auth));
//! ```

pub mod config;
pub mod middleware;

pub use config::AuthOptions;
pub use middleware::{AuthenticatedUser, require_auth};
