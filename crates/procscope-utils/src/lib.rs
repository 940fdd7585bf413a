//! # procscope Utilities
//!
//! Shared utilities for the procscope workspace.
//!
//! Currently this is the logging setup built on `tracing`, used by the
//! binary before it touches any process.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with, init_logging_with_level, LogFormat, LogGuard, LogLevel, LoggingConfig, LoggingError,
};
pub use tracing::{debug, error, info, trace, warn};
