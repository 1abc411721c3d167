//! Shared application state passed to every request handler.

use axum::http::StatusCode;
use axum_helpers::AppError;
use database::mongodb::{ConnectionManager, Database, MongoDriver};

use crate::config::Config;

/// Cheap to clone: the manager is a shared handle and the config is small.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub manager: ConnectionManager<MongoDriver>,
}

impl AppState {
    pub fn new(config: Config, manager: ConnectionManager<MongoDriver>) -> Self {
        Self { config, manager }
    }

    /// The database named in the connection URI, or 503 while there is no
    /// live client.
    pub async fn database(&self) -> Result<Database, AppError> {
        self.manager
            .driver()
            .default_database()
            .await
            .ok_or_else(|| AppError::new("Database unavailable.", StatusCode::SERVICE_UNAVAILABLE))
    }
}
