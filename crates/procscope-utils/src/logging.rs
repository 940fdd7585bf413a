//! # Logging Utilities
//!
//! Logging infrastructure for procscope using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Two output formats (pretty for terminals, JSON for log pipelines)
//! - Environment variable configuration
//! - Optional file output alongside the console
//!
//! Console output always goes to **stderr**. Standard output belongs to the
//! tables and hex dumps the binary prints, and must stay clean enough to pipe.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procscope_utils::init_logging;
//!
//! // Keep the guard alive until exit so buffered file output is flushed
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::warn!("skipping malformed region record");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directive (e.g., `RUST_LOG=debug`, `RUST_LOG=procscope_core=trace`)
//! - `PROCSCOPE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `PROCSCOPE_LOG_FILE`: Optional log file, or a directory to hold dated log files
//!
//! ## Examples
//!
//! ```rust,no_run
//! use procscope_utils::{LogFormat, LogLevel, LoggingConfig, init_logging_with};
//!
//! let config = LoggingConfig::from_env().with_level(LogLevel::Debug).with_format(LogFormat::Json);
//! let _guard = init_logging_with(config).expect("Failed to initialize logging");
//! ```

use std::env;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "PROCSCOPE_LOG_FORMAT";
/// Environment variable naming the log file (or directory)
pub const LOG_FILE_ENV: &str = "PROCSCOPE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "text" => Ok(LogFormat::Pretty),
            "json" | "prod" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default when nothing else is configured)
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (one event per resolved page)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Settings for [`init_logging_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Explicit level; overrides `RUST_LOG` when set
    pub level: Option<LogLevel>,
    /// Console and file format
    pub format: LogFormat,
    /// Log file, or a directory for dated log files
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `PROCSCOPE_LOG_FORMAT` and `PROCSCOPE_LOG_FILE`
    ///
    /// An unparsable format falls back to pretty. The level is left unset so
    /// that `RUST_LOG` applies.
    pub fn from_env() -> Self
    {
        let format = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or_default();
        let file = env::var_os(LOG_FILE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);

        Self { level: None, format, file }
    }

    /// Set an explicit level
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    /// Also write to `path`
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self
    {
        self.file = Some(path.into());
        self
    }

    /// Build the event filter
    ///
    /// Priority:
    /// 1. Explicit level (from the `--log-level` flag)
    /// 2. `RUST_LOG`, which also allows per-module directives
    /// 3. `warn`
    fn filter(&self) -> EnvFilter
    {
        if let Some(level) = self.level {
            return EnvFilter::new(Level::from(level).to_string());
        }
        match env::var("RUST_LOG") {
            Ok(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string())),
            Err(_) => EnvFilter::new(Level::WARN.to_string()),
        }
    }
}

/// Keeps the file writer alive
///
/// Dropping this flushes and stops the background file writer. Hold it until
/// the program exits.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard
{
    _file_guard: Option<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogGuard
{
    /// Resolved log file path, if file logging is on
    pub fn log_file(&self) -> Option<&Path>
    {
        self.file.as_deref()
    }
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - File logging fails (if `PROCSCOPE_LOG_FILE` is set)
pub fn init_logging() -> Result<LogGuard, LoggingError>
{
    init_logging_with(LoggingConfig::from_env())
}

/// Initialize logging with explicit level and format
///
/// `PROCSCOPE_LOG_FILE` is still honoured.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LogGuard, LoggingError>
{
    init_logging_with(LoggingConfig::from_env().with_level(level).with_format(format))
}

/// Initialize logging from a [`LoggingConfig`]
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file's directory cannot be created.
pub fn init_logging_with(config: LoggingConfig) -> Result<LogGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, config.filter())];

    let (file_guard, file) = match &config.file {
        Some(target) => {
            let (directory, file_name) = resolve_log_file(target)?;
            let appender = if target.is_dir() {
                // Name already carries the date
                tracing_appender::rolling::never(&directory, &file_name)
            } else {
                tracing_appender::rolling::daily(&directory, &file_name)
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(file_layer(config.format, config.filter(), writer));
            (Some(guard), Some(directory.join(file_name)))
        }
        None => (None, None),
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(LogGuard { _file_guard: file_guard, file })
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, filter: EnvFilter, writer: tracing_appender::non_blocking::NonBlocking) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Split a log target into (directory, file name)
///
/// A directory gets a dated file `YYYY-MM-DD-procscope.log`; anything else is
/// taken as a file path whose parent is created if missing.
fn resolve_log_file(target: &Path) -> Result<(PathBuf, String), LoggingError>
{
    if target.is_dir() {
        let today = Local::now().format("%Y-%m-%d");
        return Ok((target.to_path_buf(), format!("{today}-procscope.log")));
    }

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::InvalidPath(target.to_path_buf()))?;
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory)?;

    Ok((directory, file_name))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// The log file path has no file name component
    #[error("Invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_config_builders()
    {
        let config = LoggingConfig::default()
            .with_level(LogLevel::Trace)
            .with_format(LogFormat::Json)
            .with_file("/tmp/procscope.log");
        assert_eq!(config.level, Some(LogLevel::Trace));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/procscope.log")));
    }

    #[test]
    fn test_resolve_log_file_for_directory_is_dated()
    {
        let dir = env::temp_dir();
        let (directory, name) = resolve_log_file(&dir).unwrap();
        assert_eq!(directory, dir);
        assert!(name.ends_with("-procscope.log"));
        // YYYY-MM-DD prefix
        assert_eq!(name.len(), "2024-01-01-procscope.log".len());
    }

    #[test]
    fn test_resolve_log_file_bare_name_uses_current_dir()
    {
        let (directory, name) = resolve_log_file(Path::new("procscope-test.log")).unwrap();
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(name, "procscope-test.log");
    }
}
