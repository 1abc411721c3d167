use std::process::ExitCode;

use axum_helpers::{ErrorHandlerConfig, create_app, create_router, shutdown_signal};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::{ConnectionManager, MongoDriver, exit_status};
use tracing::{Instrument, error, info};

mod api;
mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    install_color_eyre();

    let config = Config::from_env()?;

    // Dropped last so buffered file output is flushed
    let guards = init_tracing(&config.environment, &config.logging);

    run(config).instrument(guards.service_span()).await
}

/// Initial connect, abandoned for a graceful shutdown if `shutdown` resolves
/// first. `Some` carries the exit status when the process should stop.
async fn establish<F>(manager: &ConnectionManager<MongoDriver>, shutdown: F) -> Option<u8>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        connected = manager.connect() => {
            if let Err(e) = &connected {
                error!(error = %e, "Could not establish the database connection");
                return Some(exit_status(&connected));
            }
            None
        }
        _ = shutdown => {
            info!("Shutdown requested while connecting to MongoDB");
            Some(exit_status(&manager.shutdown().await))
        }
    }
}

async fn run(config: Config) -> eyre::Result<ExitCode> {
    info!("Connecting to MongoDB at {}", config.mongodb.redacted_uri());

    let manager = ConnectionManager::new(MongoDriver::new(), config.mongodb.clone());
    if let Some(code) = establish(&manager, shutdown_signal()).await {
        return Ok(ExitCode::from(code));
    }

    let state = AppState::new(config, manager.clone());
    let router = create_router(
        api::routes(&state),
        ErrorHandlerConfig::new(state.config.environment),
    );

    let shutdown = {
        let manager = manager.clone();
        async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                fatal = manager.wait_for_fatal() => {
                    error!(error = %fatal, "Database connection lost for good, stopping the server");
                }
            }
        }
    };

    let served = create_app(router, &state.config.server, shutdown).await;
    let closed = manager.shutdown().await;
    served?;

    if let Some(fatal) = manager.fatal() {
        return Ok(ExitCode::from(exit_status::<()>(&Err(fatal))));
    }

    info!("Kit API shutdown complete");
    Ok(ExitCode::from(exit_status(&closed)))
}
