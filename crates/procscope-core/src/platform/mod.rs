//! # Platform-Specific Implementations
//!
//! This module contains the kernel-interface backends.
//!
//! - **Linux**: procfs (`/proc/<pid>/maps`, `/proc/<pid>/pagemap`,
//!   `/proc/<pid>/status`) plus `process_vm_readv(2)`
//!   - See: [proc(5) man page](https://man7.org/linux/man-pages/man5/proc.5.html)
//!
//! Other Unix kernels expose different interfaces (or none) and are not
//! supported; [`crate::inspector::create_inspector`] reports `Unsupported`
//! there.

#[cfg(target_os = "linux")]
pub mod linux;
