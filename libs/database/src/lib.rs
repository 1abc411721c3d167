//! Database connection lifecycle for services backed by MongoDB
//!
//! The centerpiece is [`mongodb::ConnectionManager`]: it owns one document
//! database connection, retries failed initial connects on a fixed interval
//! up to a bounded count, reconnects when an established connection drops,
//! and closes the connection on graceful shutdown. Failures are returned as
//! [`DatabaseError`] values; deciding whether to exit the process is left to
//! the owning application.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB driver, connection manager and status types
//! - `config` - `MongoConfig::from_env` via `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{ConnectionManager, MongoConfig, MongoDriver};
//!
//! let manager = ConnectionManager::new(MongoDriver::new(), MongoConfig::new(uri));
//! manager.connect().await?;
//! println!("{:?}", manager.status());
//!
//! // on SIGINT / SIGTERM
//! let exit = database::mongodb::exit_status(&manager.shutdown().await);
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

// Re-exports for convenience
pub use common::{DatabaseError, DatabaseResult, RetryDecision, RetryPolicy};
