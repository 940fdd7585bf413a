//! # Error Types
//!
//! General error handling for process inspection.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Not every failure is an error. An unmapped address during a memory walk is
//! reported through [`crate::types::ReadStatus::AccessFault`], and an absent
//! page is simply not emitted by the page resolver. Only failures that abort a
//! top-level operation surface as an [`InspectError`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for inspection operations
///
/// ## Error Categories
///
/// 1. **Source errors**: ProcessNotFound, SourceUnavailable
/// 2. **Permission errors**: PermissionDenied
/// 3. **Record errors**: MalformedRecord (normally recovered locally)
/// 4. **Read errors**: ReadFailed, Io
/// 5. **Input errors**: NoRegions, RegionLimitExceeded, InvalidArgument
/// 6. **Platform errors**: Unsupported
#[derive(Error, Debug)]
pub enum InspectError
{
    /// The process with the given PID doesn't exist or has exited
    ///
    /// This happens when:
    /// - You provide an invalid PID
    /// - The process exited between enumeration and inspection
    #[error("Process not found: PID {0}")]
    ProcessNotFound(u32),

    /// Insufficient permissions to inspect the target process
    ///
    /// On Linux, this typically means:
    /// - The target belongs to another user and we lack `CAP_SYS_PTRACE`
    /// - `kernel.yama.ptrace_scope` forbids cross-process reads
    /// - `/proc/<pid>/pagemap` requires elevated privileges
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A kernel-exposed source exists but could not be opened or read
    #[error("Source unavailable: {}: {source}", path.display())]
    SourceUnavailable
    {
        /// Path of the procfs file or directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// One record in a text or binary source did not match the expected shape
    ///
    /// Enumerations catch this, log it, and move on to the next record.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord
    {
        /// 1-based line number within the source
        line: usize,
        /// What was wrong with the record
        reason: String,
    },

    /// `process_vm_readv` failed for a reason other than an access fault
    #[error("Failed to read memory at 0x{address:016x}: {source}")]
    ReadFailed
    {
        /// Remote address of the failed read
        address: u64,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Page resolution was requested with an empty region list
    #[error("No memory regions available for PID {0}")]
    NoRegions(u32),

    /// The region list is larger than the configured bound
    #[error("Region limit exceeded: more than {limit} regions")]
    RegionLimitExceeded
    {
        /// Configured `max_regions`
        limit: usize,
    },

    /// Invalid argument passed to an inspection function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The current platform has no procfs-style interface
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl InspectError
{
    /// Map an error from opening a per-process source onto the right variant.
    ///
    /// `NotFound` means the process is gone, `PermissionDenied` is surfaced as
    /// such, and anything else becomes `SourceUnavailable` with the path kept.
    pub fn from_open(pid: u32, path: &Path, err: io::Error) -> Self
    {
        match err.kind() {
            io::ErrorKind::NotFound => InspectError::ProcessNotFound(pid),
            io::ErrorKind::PermissionDenied => {
                InspectError::PermissionDenied(format!("cannot open {}: {err}", path.display()))
            }
            _ => InspectError::SourceUnavailable {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Build a `MalformedRecord` error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self
    {
        InspectError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// `true` for errors that mean "not allowed to look" rather than "nothing there".
    pub fn is_permission_denied(&self) -> bool
    {
        matches!(self, InspectError::PermissionDenied(_))
    }
}

/// Convenience type alias for `Result<T, InspectError>`
///
/// ```rust
/// use procscope_core::error::InspectResult;
/// fn foo() -> InspectResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type InspectResult<T> = std::result::Result<T, InspectError>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_from_open_maps_not_found_to_process_not_found()
    {
        let err = io::Error::from(io::ErrorKind::NotFound);
        let mapped = InspectError::from_open(42, Path::new("/proc/42/maps"), err);
        assert!(matches!(mapped, InspectError::ProcessNotFound(42)));
    }

    #[test]
    fn test_from_open_maps_permission_denied()
    {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let mapped = InspectError::from_open(1, Path::new("/proc/1/pagemap"), err);
        assert!(mapped.is_permission_denied());
        assert!(mapped.to_string().contains("/proc/1/pagemap"));
    }

    #[test]
    fn test_from_open_keeps_path_for_other_errors()
    {
        let err = io::Error::other("boom");
        let mapped = InspectError::from_open(7, Path::new("/proc/7/maps"), err);
        match mapped {
            InspectError::SourceUnavailable { path, .. } => assert_eq!(path, PathBuf::from("/proc/7/maps")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
