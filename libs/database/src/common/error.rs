/// Unified database error type for connection lifecycle operations
///
/// `Clone` so the same failure can be returned to the caller and published
/// to anyone waiting on the manager's fatal signal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatabaseError {
    /// MongoDB driver errors (option parsing, client construction)
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A single connection attempt failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Initial connection (or reconnection) gave up after the configured retries
    #[error("Failed to connect after {retries} retries: {last_error}")]
    RetriesExhausted { retries: u32, last_error: String },

    /// The manager is shutting down; no further attempts are made
    #[error("Connection manager is shutting down")]
    ShuttingDown,

    /// Closing the connection during shutdown failed
    #[error("Failed to close connection: {0}")]
    CloseFailed(String),

    /// Configuration error (never retried)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Misconfiguration and shutdown are final; everything else is treated
    /// as a network or server hiccup.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            DatabaseError::ConfigError(_)
                | DatabaseError::ShuttingDown
                | DatabaseError::RetriesExhausted { .. }
        )
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
