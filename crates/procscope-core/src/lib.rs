//! # procscope-core
//!
//! Process memory introspection primitives for procscope.
//!
//! This crate provides:
//! - Region list parsing (`/proc/<pid>/maps`)
//! - Region classification (executable regions, shared libraries)
//! - Per-page physical mapping via page-table metadata (`/proc/<pid>/pagemap`)
//! - Resumable cross-process memory reads (`process_vm_readv`)
//! - Process and thread enumeration
//!
//! Nothing here writes to the target. Every call works on a best-effort
//! snapshot of a process that keeps running underneath us.
//!
//! ## Platform Support
//!
//! - **Linux**: procfs + `process_vm_readv`
//! - **Others**: types and classification only; `create_inspector` returns `Unsupported`
//!
//! ## Why unsafe code is needed
//!
//! Two calls have no safe wrapper in `libc`: `sysconf(_SC_PAGESIZE)` to learn
//! the page size, and `process_vm_readv` to read another process's memory.
//! Both are wrapped in safe functions in `platform::linux`.

#![allow(unsafe_code)] // Required for sysconf and process_vm_readv

pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod inspector;
pub mod platform;
pub mod prelude;
pub mod types;

pub use config::InspectorConfig;
// Re-export commonly used types
pub use error::{InspectError, InspectResult};
pub use inspector::{create_inspector, Inspector};
#[cfg(target_os = "linux")]
pub use platform::linux::LinuxInspector;
pub use types::{Address, MemoryReadChunk, MemoryRegion, PageStatus, ProcessId, ReadStatus};
