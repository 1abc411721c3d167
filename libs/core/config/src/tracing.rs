use crate::{env_or_default, Environment};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Span};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const DEFAULT_SERVICE_NAME: &str = "service-kit";

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Where logs go and how the service identifies itself in them.
#[derive(Clone, Debug)]
pub struct LogSettings {
    /// Attached to every event through the root `service` span
    pub service_name: String,
    /// Directory for `error.log` / `combined.log` outside production
    pub log_dir: PathBuf,
}

impl LogSettings {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_dir: PathBuf::from("."),
        }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// `SERVICE_NAME` (default "service-kit") and `LOG_DIR` (default ".")
    pub fn from_env() -> Self {
        Self::new(env_or_default("SERVICE_NAME", DEFAULT_SERVICE_NAME))
            .with_log_dir(env_or_default("LOG_DIR", "."))
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

/// Keeps the background log writers alive. Drop it last in `main`, otherwise
/// buffered file output is lost.
pub struct LogGuards {
    service_span: Span,
    writers: Vec<WorkerGuard>,
}

impl LogGuards {
    /// Root span carrying the service name; instrument the main future with it.
    pub fn service_span(&self) -> Span {
        self.service_span.clone()
    }

    pub fn writes_files(&self) -> bool {
        !self.writers.is_empty()
    }
}

/// Default level when `RUST_LOG` is not set.
pub fn default_level(environment: &Environment) -> &'static str {
    if environment.is_production() {
        "info"
    } else {
        "debug"
    }
}

struct LogFiles {
    errors: NonBlocking,
    combined: NonBlocking,
    guards: Vec<WorkerGuard>,
}

fn open_log_files(dir: &Path) -> Result<LogFiles, InitError> {
    let open = |prefix: &str| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .build(dir)
    };

    let (errors, errors_guard) = tracing_appender::non_blocking(open("error")?);
    let (combined, combined_guard) = tracing_appender::non_blocking(open("combined")?);

    Ok(LogFiles {
        errors,
        combined,
        guards: vec![errors_guard, combined_guard],
    })
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): JSON to stdout, `info` level,
///   no log files.
/// - **Development** (default): pretty stdout at `debug` level, plus JSON
///   `error.log` (errors only) and `combined.log` (everything) in
///   `settings.log_dir`. If the files cannot be opened, logging continues on
///   stdout only.
///
/// `RUST_LOG` overrides the level in both modes. Both modes install
/// `tracing_error::ErrorLayer` so span traces can be captured for error
/// responses.
///
/// Safe to call multiple times: later calls leave the first subscriber in
/// place (common in tests).
pub fn init_tracing(environment: &Environment, settings: &LogSettings) -> LogGuards {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(environment)));

    let mut writers = Vec::new();
    let mut file_error = None;

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        let (errors_layer, combined_layer) = match open_log_files(&settings.log_dir) {
            Ok(files) => {
                writers.extend(files.guards);
                (
                    Some(
                        fmt::layer()
                            .json()
                            .with_ansi(false)
                            .with_writer(files.errors)
                            .with_filter(LevelFilter::ERROR),
                    ),
                    Some(
                        fmt::layer()
                            .json()
                            .with_ansi(false)
                            .with_writer(files.combined),
                    ),
                )
            }
            Err(e) => {
                file_error = Some(e);
                (None, None)
            }
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).pretty())
            .with(errors_layer)
            .with(combined_layer)
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                service = %settings.service_name,
                "Tracing initialized with ErrorLayer. Environment: {:?}",
                environment
            );
            if let Some(e) = file_error {
                warn!(
                    error = %e,
                    log_dir = %settings.log_dir.display(),
                    "Could not open log files, logging to stdout only"
                );
            }
        }
        Err(_) => {
            // A subscriber is already installed; its writers stay in charge.
            writers.clear();
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }

    LogGuards {
        service_span: info_span!("service", service = %settings.service_name),
        writers,
    }
}
