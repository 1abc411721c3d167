use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::event::EventHandler;
use mongodb::event::command::CommandEvent;
use mongodb::event::sdam::SdamEvent;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use super::ConnectOptions;
use crate::common::{DatabaseError, DatabaseResult};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle events a driver reports about its connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// The server confirmed the connection
    Connected,
    /// A connection-level error (heartbeat failure, network error)
    Error(String),
    /// A previously confirmed connection went away
    Disconnected,
}

/// Descriptive fields read from an established connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: String,
    pub database_name: String,
}

/// The slice of a document database driver the connection manager needs:
/// connect, close, and a stream of lifecycle events.
///
/// `connect` may be called again after a failure or a drop; implementations
/// replace whatever connection they held before.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentDriver: Send + Sync {
    /// Open a connection and verify it with a round trip
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> DatabaseResult<ConnectionInfo>;

    /// Close the current connection, if any
    async fn close(&self) -> DatabaseResult<()>;

    /// Subscribe to lifecycle events
    fn subscribe(&self) -> broadcast::Receiver<DriverEvent>;
}

/// [`DocumentDriver`] backed by the official `mongodb` crate
///
/// Server heartbeats are translated into [`DriverEvent`]s: the first
/// successful heartbeat after an unhealthy period emits `Connected`, every
/// failed heartbeat emits `Error`, and the first failure after a healthy
/// period also emits `Disconnected`.
///
/// # Example
/// ```ignore
/// use database::mongodb::{ConnectionManager, MongoConfig, MongoDriver};
///
/// let driver = MongoDriver::new();
/// let manager = ConnectionManager::new(driver, MongoConfig::new("mongodb://localhost:27017/app"));
/// manager.connect().await?;
/// ```
pub struct MongoDriver {
    client: Mutex<Option<Client>>,
    events: broadcast::Sender<DriverEvent>,
    healthy: Arc<AtomicBool>,
}

impl MongoDriver {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client: Mutex::new(None),
            events,
            healthy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The current client, if connected. Cheap to clone; shares the pool.
    pub async fn client(&self) -> Option<Client> {
        self.client.lock().await.clone()
    }

    /// The database named in the connection string, if any
    pub async fn default_database(&self) -> Option<Database> {
        self.client().await.and_then(|c| c.default_database())
    }

    /// Round-trip a `ping` and report its latency
    pub async fn ping(&self) -> DatabaseResult<Duration> {
        let client = self
            .client()
            .await
            .ok_or_else(|| DatabaseError::ConnectionFailed("not connected".to_string()))?;

        let start = Instant::now();
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(start.elapsed())
    }

    fn sdam_handler(&self) -> EventHandler<SdamEvent> {
        let events = self.events.clone();
        let healthy = Arc::clone(&self.healthy);

        EventHandler::callback(move |event: SdamEvent| match event {
            SdamEvent::ServerHeartbeatSucceeded(_) => publish_transition(&events, &healthy, true),
            SdamEvent::ServerHeartbeatFailed(failed) => {
                let _ = events.send(DriverEvent::Error(failed.failure.to_string()));
                publish_transition(&events, &healthy, false);
            }
            _ => {}
        })
    }
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit `Connected`/`Disconnected` only when health actually flips
fn publish_transition(events: &broadcast::Sender<DriverEvent>, healthy: &AtomicBool, up: bool) {
    if healthy.swap(up, Ordering::SeqCst) != up {
        let event = if up {
            DriverEvent::Connected
        } else {
            DriverEvent::Disconnected
        };
        // No subscribers is fine
        let _ = events.send(event);
    }
}

#[async_trait]
impl DocumentDriver for MongoDriver {
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> DatabaseResult<ConnectionInfo> {
        // A URI the driver cannot parse is misconfiguration, not a transient failure
        let mut client_options = ClientOptions::parse(uri)
            .await
            .map_err(|e| DatabaseError::ConfigError(format!("invalid MongoDB URI: {e}")))?;

        client_options.max_pool_size = Some(options.max_pool_size);
        client_options.server_selection_timeout = Some(options.server_selection_timeout);
        client_options.connect_timeout = Some(options.connect_timeout);
        if let Some(ref app_name) = options.app_name {
            client_options.app_name = Some(app_name.clone());
        }
        client_options.sdam_event_handler = Some(self.sdam_handler());
        if options.command_logging {
            client_options.command_event_handler =
                Some(EventHandler::callback(|event: CommandEvent| {
                    debug!(?event, "MongoDB command");
                }));
        }

        let info = ConnectionInfo {
            host: client_options
                .hosts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            database_name: client_options.default_database.clone().unwrap_or_default(),
        };

        let client = Client::with_options(client_options)?;

        // Verify connection (lightweight ping)
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            // Heartbeats may have reported this client healthy before the ping failed
            publish_transition(&self.events, &self.healthy, false);
            return Err(DatabaseError::ConnectionFailed(e.to_string()));
        }

        publish_transition(&self.events, &self.healthy, true);

        let previous = self.client.lock().await.replace(client);
        if let Some(previous) = previous {
            debug!("Shutting down replaced MongoDB client");
            previous.shutdown().await;
        }

        info!(host = %info.host, database = %info.database_name, "Successfully connected to MongoDB");
        Ok(info)
    }

    async fn close(&self) -> DatabaseResult<()> {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            client.shutdown().await;
            publish_transition(&self.events, &self.healthy, false);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }
}
