//! # Logger
//!
//! Installs the global `tracing` subscriber for keyroute binaries.
//!
//! Console output is compact and colored; file output goes through a rolling,
//! non-blocking appender and may be written as JSON. `RUST_LOG` is honored on top of
//! the configured level unless an explicit [`LoggerBuilder::env_filter`] is given.
//!
//! Library crates in this workspace only emit events; they never install a subscriber.
//!
//! ## Example
//!
//! ```rust
//! # use keyroute_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("keyroute")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerOptions {
    console: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileOptions>,
}

#[derive(Debug)]
struct FileOptions {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, env_filter: None, file: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

/// Builder for the global tracing subscriber. A name is mandatory before [`init`](LoggerBuilder::init).
#[derive(Debug)]
pub struct LoggerBuilder<N = NoName> {
    options: LoggerOptions,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Sets the application name, also used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { options: self.options, name: WithName(name.into()) }
    }
}

impl<N> LoggerBuilder<N> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.options.level = level;
        self
    }

    /// Programmatic filter directives such as `keyroute_crypto=debug`.
    ///
    /// When set, `RUST_LOG` is ignored. Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.options.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.options.console = enabled;
        self
    }

    /// Enables rolling file output into `dir`.
    #[must_use]
    pub fn path(mut self, dir: impl Into<PathBuf>) -> Self {
        let file = self.options.file.take().unwrap_or_else(|| FileOptions {
            dir: PathBuf::new(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        self.options.file = Some(FileOptions { dir: dir.into(), ..file });
        self
    }

    /// File rotation strategy. Ignored without [`LoggerBuilder::path`].
    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.options.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files to keep. Ignored without [`LoggerBuilder::path`].
    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.options.file.as_mut() {
            file.max_files = max;
        }
        self
    }

    /// Writes file output as JSON lines. Ignored without [`LoggerBuilder::path`].
    #[must_use]
    pub fn json(mut self) -> Self {
        if let Some(file) = self.options.file.as_mut() {
            file.json = true;
        }
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer guard and must be kept alive
    /// for as long as logs should be flushed.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad filter, or when no output is enabled.
    /// * [`LoggerError::Appender`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { options, name: WithName(name) } = self;
        validate(&options, &name)?;

        let filter = env_filter(&options)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if options.console {
            layers.push(fmt::layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed());
        }

        let guard = match options.file {
            Some(file) => {
                let (layer, guard) = file_layer(&name, file)?;
                layers.push(layer);
                Some(guard)
            }
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }
}

fn file_layer(name: &str, file: FileOptions) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&file.dir).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create path: {}", file.dir.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(file.rotation)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(file.max_files)
        .build(&file.dir)
        .context("Building rolling file appender")?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer = if file.json { layer.json().boxed() } else { layer.boxed() };

    Ok((layer, guard))
}

fn validate(options: &LoggerOptions, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if options.file.as_ref().is_some_and(|f| f.max_files == 0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(options: &LoggerOptions) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(options.level.into());
    match &options.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{directives}': {e}").into(),
                context: None,
            }
        }),
    }
}

/// Handle to the installed logging system.
///
/// Holds the non-blocking writer guard; dropping it flushes pending file output.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts configuring the global subscriber.
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { options: LoggerOptions::default(), name: NoName }
    }

    /// Returns the file writer guard when file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
