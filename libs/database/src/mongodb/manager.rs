use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::{ConnectionStatus, DocumentDriver, DriverEvent, MongoConfig, ReadyState};
use crate::common::{DatabaseError, DatabaseResult, RetryDecision, RetryPolicy};

/// Mutable connection state. Only touched inside [`ConnectionManager::update`].
#[derive(Debug, Default)]
struct ConnectionState {
    is_connected: bool,
    ready_state: ReadyState,
    host: String,
    database_name: String,
    retry_count: u32,
    shutting_down: bool,
    reconnecting: bool,
    closed: bool,
    /// A `connect` loop is running; events must not touch its retry budget
    connecting: bool,
    /// `Connected` seen during the current attempt, applied if it succeeds
    confirmed: bool,
}

impl ConnectionState {
    fn snapshot(&self) -> ConnectionStatus {
        ConnectionStatus {
            is_connected: self.is_connected,
            ready_state: self.ready_state,
            host: self.host.clone(),
            database_name: self.database_name.clone(),
            retry_count: self.retry_count,
        }
    }
}

struct Inner<D> {
    driver: D,
    config: MongoConfig,
    policy: RetryPolicy,
    state: Mutex<ConnectionState>,
    status_tx: watch::Sender<ConnectionStatus>,
    shutdown_tx: watch::Sender<bool>,
    fatal_tx: watch::Sender<Option<DatabaseError>>,
}

/// Owns the lifetime of one document-database connection
///
/// - `connect` retries failed attempts on a fixed interval, up to
///   `max_retries`, then gives up with [`DatabaseError::RetriesExhausted`].
/// - A `Disconnected` event after a confirmed connection starts exactly one
///   background reconnect, bounded by the same policy. If that reconnect
///   gives up, the error is published through [`fatal`](Self::fatal) and
///   [`wait_for_fatal`](Self::wait_for_fatal).
/// - `shutdown` stops all retries and reconnects before closing the driver.
///
/// The handle is cheap to clone; all clones share one state. Construct it
/// inside a Tokio runtime since `new` spawns the driver event listener.
///
/// # Example
/// ```ignore
/// use database::mongodb::{ConnectionManager, MongoConfig, MongoDriver, exit_status};
///
/// let manager = ConnectionManager::new(MongoDriver::new(), MongoConfig::from_env()?);
/// manager.connect().await?;
///
/// // ... serve until a termination signal ...
///
/// let code = exit_status(&manager.shutdown().await);
/// ```
pub struct ConnectionManager<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for ConnectionManager<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DocumentDriver + 'static> ConnectionManager<D> {
    pub fn new(driver: D, config: MongoConfig) -> Self {
        let events = driver.subscribe();
        let (status_tx, _) = watch::channel(ConnectionStatus::default());
        let (shutdown_tx, _) = watch::channel(false);
        let (fatal_tx, _) = watch::channel(None);

        let inner = Arc::new(Inner {
            policy: config.retry_policy(),
            driver,
            config,
            state: Mutex::new(ConnectionState::default()),
            status_tx,
            shutdown_tx,
            fatal_tx,
        });

        tokio::spawn(listen(Arc::downgrade(&inner), events));

        Self { inner }
    }

    /// The underlying driver, e.g. to reach the MongoDB client
    pub fn driver(&self) -> &D {
        &self.inner.driver
    }

    pub fn config(&self) -> &MongoConfig {
        &self.inner.config
    }

    /// Connect, retrying transient failures on a fixed interval.
    ///
    /// Resolves once an attempt succeeds or the retry budget is spent. A
    /// successful return does not flip `is_connected`; that waits for the
    /// driver's `Connected` event.
    pub async fn connect(&self) -> DatabaseResult<()> {
        let uri = self.inner.config.uri().trim();
        if uri.is_empty() {
            error!("MongoDB URI is not defined");
            return Err(DatabaseError::ConfigError(
                "MongoDB URI is not defined".to_string(),
            ));
        }

        let options = self.inner.config.connect_options();
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let _connecting = ConnectingGuard(self);

        loop {
            let proceed = self.update(|state| {
                if state.shutting_down {
                    return false;
                }
                state.connecting = true;
                state.confirmed = false;
                state.ready_state = ReadyState::Connecting;
                true
            });
            if !proceed {
                return Err(DatabaseError::ShuttingDown);
            }

            debug!(uri = %self.inner.config.redacted_uri(), "Connecting to MongoDB");

            let err = match self.inner.driver.connect(uri, &options).await {
                Ok(info) => {
                    let shutting_down = self.update(|state| {
                        state.connecting = false;
                        state.retry_count = 0;
                        state.host = info.host;
                        state.database_name = info.database_name;
                        if !state.shutting_down {
                            state.ready_state = ReadyState::Connected;
                            state.is_connected |= state.confirmed;
                        }
                        state.shutting_down
                    });

                    // Shutdown began while the attempt was in flight
                    if shutting_down {
                        if let Err(e) = self.inner.driver.close().await {
                            warn!(error = %e, "Failed to close connection opened during shutdown");
                        }
                        return Err(DatabaseError::ShuttingDown);
                    }
                    return Ok(());
                }
                Err(err) => err,
            };

            self.update(|state| {
                state.is_connected = false;
                state.confirmed = false;
                state.ready_state = ReadyState::Disconnected;
            });

            if !err.is_transient() {
                error!(error = %err, "MongoDB connection failed");
                return Err(err);
            }

            let retries = self.update(|state| state.retry_count);
            match self.inner.policy.after_failure(retries) {
                RetryDecision::Retry { attempt, delay } => {
                    self.update(|state| state.retry_count = attempt);
                    warn!(error = %err, "MongoDB connection attempt failed");
                    info!(
                        "Retrying connection... Attempt {} of {}",
                        attempt, self.inner.policy.max_retries
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown_rx.wait_for(|done| *done) => {
                            debug!("Retry cancelled by shutdown");
                            return Err(DatabaseError::ShuttingDown);
                        }
                    }
                }
                RetryDecision::GiveUp => {
                    let fatal = DatabaseError::RetriesExhausted {
                        retries: self.inner.policy.max_retries,
                        last_error: err.to_string(),
                    };
                    error!(error = %fatal, "Giving up on MongoDB connection");
                    self.inner.fatal_tx.send_replace(Some(fatal.clone()));
                    return Err(fatal);
                }
            }
        }
    }

    /// Apply one driver lifecycle event to the connection state.
    ///
    /// A `Connected` event that arrives while `connect` is still looping is
    /// held back until that attempt succeeds, so it never resets the retry
    /// count mid-loop. A `Disconnected` event that follows a confirmed
    /// connection schedules a reconnect unless shutdown has begun or a
    /// connect is already running.
    pub fn apply_event(&self, event: DriverEvent) {
        let reconnect = self.update(|state| match &event {
            DriverEvent::Connected => {
                if state.connecting {
                    state.confirmed = true;
                } else if !state.shutting_down {
                    state.is_connected = true;
                    state.retry_count = 0;
                    state.ready_state = ReadyState::Connected;
                }
                false
            }
            DriverEvent::Error(_) => {
                state.is_connected = false;
                state.confirmed = false;
                false
            }
            DriverEvent::Disconnected => {
                let was_up = state.is_connected || state.ready_state == ReadyState::Connected;
                state.is_connected = false;
                state.confirmed = false;
                if !state.shutting_down && !state.connecting {
                    state.ready_state = ReadyState::Disconnected;
                }

                let reconnect =
                    was_up && !state.shutting_down && !state.reconnecting && !state.connecting;
                if reconnect {
                    state.reconnecting = true;
                }
                reconnect
            }
        });

        match event {
            DriverEvent::Connected => info!("MongoDB connected successfully"),
            DriverEvent::Error(message) => error!(error = %message, "MongoDB connection error"),
            DriverEvent::Disconnected => warn!("MongoDB disconnected"),
        }

        if reconnect {
            let manager = self.clone();
            tokio::spawn(async move {
                info!("Attempting to reconnect to MongoDB");
                let result = manager.connect().await;
                manager.update(|state| state.reconnecting = false);
                match result {
                    Ok(()) => info!("MongoDB reconnect attempt finished"),
                    Err(DatabaseError::ShuttingDown) => debug!("Reconnect abandoned for shutdown"),
                    Err(e) => error!(error = %e, "MongoDB reconnect failed"),
                }
            });
        }
    }

    /// Snapshot of the connection state. Valid before any connect attempt.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// Follow status changes
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// The unrecoverable error, if the manager has given up
    pub fn fatal(&self) -> Option<DatabaseError> {
        self.inner.fatal_tx.borrow().clone()
    }

    /// Wait until the manager gives up on the connection
    pub async fn wait_for_fatal(&self) -> DatabaseError {
        let mut fatal_rx = self.inner.fatal_tx.subscribe();
        let fatal = fatal_rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|fatal| (*fatal).clone());
        fatal.unwrap_or(DatabaseError::ShuttingDown)
    }

    /// Close the connection for good.
    ///
    /// Marks shutdown before anything else, so no retry or reconnect starts
    /// afterwards and pending backoff waits return immediately. Calling it
    /// again after a successful close is a no-op.
    pub async fn shutdown(&self) -> DatabaseResult<()> {
        let closed = self.update(|state| {
            if !state.closed {
                state.shutting_down = true;
                state.ready_state = ReadyState::Disconnecting;
            }
            state.closed
        });
        if closed {
            return Ok(());
        }

        self.inner.shutdown_tx.send_replace(true);

        match self.inner.driver.close().await {
            Ok(()) => {
                self.update(|state| {
                    state.closed = true;
                    state.is_connected = false;
                    state.ready_state = ReadyState::Disconnected;
                });
                info!("MongoDB connection closed through app termination");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error during database disconnection");
                self.update(|state| state.ready_state = ReadyState::Disconnected);
                Err(match e {
                    DatabaseError::CloseFailed(_) => e,
                    other => DatabaseError::CloseFailed(other.to_string()),
                })
            }
        }
    }

    /// Single entry point for state mutation; publishes the new snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut ConnectionState) -> R) -> R {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut state);

        let next = state.snapshot();
        self.inner.status_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        out
    }
}

/// Clears the `connecting` flag however `connect` ends, including when its
/// future is dropped mid-backoff.
struct ConnectingGuard<'a, D: DocumentDriver + 'static>(&'a ConnectionManager<D>);

impl<D: DocumentDriver + 'static> Drop for ConnectingGuard<'_, D> {
    fn drop(&mut self) {
        self.0.update(|state| state.connecting = false);
    }
}

async fn listen<D: DocumentDriver + 'static>(
    inner: Weak<Inner<D>>,
    mut events: broadcast::Receiver<DriverEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                ConnectionManager { inner }.apply_event(event);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Driver event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Driver event listener stopped");
}

/// Process exit status for a lifecycle outcome: 0 on success, 1 on failure
pub fn exit_status<T>(result: &DatabaseResult<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
