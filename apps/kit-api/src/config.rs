use axum_helpers::AuthOptions;
use core_config::{Environment, FromEnv, server::ServerConfig, tracing::LogSettings};
use database::mongodb::MongoConfig;

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub logging: LogSettings,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub auth: AuthOptions,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            logging: LogSettings::from_env(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            auth: AuthOptions::from_env()?,
        })
    }
}
