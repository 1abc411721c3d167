use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, Environment, FromEnv, env_parse_or};

use crate::common::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL, RetryPolicy};

const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// MongoDB connection settings
///
/// The URI is only checked when `ConnectionManager::connect` runs: an empty
/// URI fails that call with a configuration error and is never retried.
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
/// use std::time::Duration;
///
/// let config = MongoConfig::new("mongodb://localhost:27017/app")
///     .with_max_retries(5)
///     .with_retry_interval(Duration::from_secs(2));
///
/// // From environment variables (requires `config` feature)
/// let config = MongoConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Connection string: mongodb://[username:password@]host[:port][/database][?options]
    pub uri: String,

    /// Optional application name for server logs
    pub app_name: Option<String>,

    /// Retries after a failed connect before giving up
    pub max_retries: u32,

    /// Fixed wait between connect attempts
    pub retry_interval: Duration,

    /// Maximum number of connections in the driver pool
    pub max_pool_size: u32,

    /// How long the driver looks for a suitable server per operation
    pub server_selection_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Log every driver command at debug level (development aid)
    pub command_logging: bool,
}

/// Options handed to the driver untouched; the manager never interprets them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub max_pool_size: u32,
    pub server_selection_timeout: Duration,
    pub connect_timeout: Duration,
    pub app_name: Option<String>,
    pub command_logging: bool,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            app_name: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            server_selection_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_logging: false,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    /// Set the application name for server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_command_logging(mut self, enabled: bool) -> Self {
        self.command_logging = enabled;
        self
    }

    /// Get a reference to the connection URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(self.max_retries)
            .with_interval(self.retry_interval)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            max_pool_size: self.max_pool_size,
            server_selection_timeout: self.server_selection_timeout,
            connect_timeout: self.connect_timeout,
            app_name: self.app_name.clone(),
            command_logging: self.command_logging,
        }
    }

    /// The URI with any password masked, for log lines.
    pub fn redacted_uri(&self) -> String {
        let Some((scheme, rest)) = self.uri.split_once("://") else {
            return self.uri.clone();
        };
        let Some((credentials, hosts)) = rest.rsplit_once('@') else {
            return self.uri.clone();
        };
        match credentials.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:****@{hosts}"),
            None => self.uri.clone(),
        }
    }
}

/// Load MongoConfig from environment variables
///
/// Environment variables:
/// - `MONGO_URI` or `MONGODB_URL` (required) - MongoDB connection string
/// - `DB_MAX_RETRIES` (optional, default: 3)
/// - `DB_RETRY_INTERVAL_MS` (optional, default: 5000)
/// - `MONGODB_MAX_POOL_SIZE` (optional, default: 10)
/// - `MONGODB_APP_NAME` (optional)
///
/// Command logging follows `core_config::Environment`: on in development.
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let uri = std::env::var("MONGO_URI")
            .or_else(|_| std::env::var("MONGODB_URL"))
            .map_err(|_| ConfigError::MissingEnvVar("MONGO_URI or MONGODB_URL".to_string()))?;

        let retry_interval_ms =
            env_parse_or("DB_RETRY_INTERVAL_MS", DEFAULT_RETRY_INTERVAL.as_millis() as u64)?;

        let mut config = Self::new(uri)
            .with_max_retries(env_parse_or("DB_MAX_RETRIES", DEFAULT_MAX_RETRIES)?)
            .with_retry_interval(Duration::from_millis(retry_interval_ms))
            .with_pool_size(env_parse_or("MONGODB_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE)?)
            .with_command_logging(Environment::from_env().is_development());

        config.app_name = std::env::var("MONGODB_APP_NAME").ok();

        Ok(config)
    }
}
