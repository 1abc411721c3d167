//! MongoDB connection lifecycle
//!
//! [`ConnectionManager`] drives any [`DocumentDriver`]; [`MongoDriver`] is the
//! implementation over the official driver.

mod config;
mod connector;
mod manager;
mod status;

pub use config::{ConnectOptions, MongoConfig};
#[cfg(test)]
pub use connector::MockDocumentDriver;
pub use connector::{ConnectionInfo, DocumentDriver, DriverEvent, MongoDriver};
pub use manager::{ConnectionManager, exit_status};
pub use status::{ConnectionStatus, ReadyState};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
