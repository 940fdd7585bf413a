//! # Linux procfs Backend
//!
//! Process inspection through `/proc` and `process_vm_readv(2)`.
//!
//! - [`maps`]: region list parsing (`/proc/<pid>/maps`)
//! - [`pagemap`]: per-page physical mapping (`/proc/<pid>/pagemap`)
//! - [`memory`]: cross-process reads
//! - [`procinfo`]: process and thread enumeration
//! - [`inspector`]: [`LinuxInspector`], the [`crate::Inspector`] implementation
//!
//! ## References
//!
//! - [proc(5) man page](https://man7.org/linux/man-pages/man5/proc.5.html)
//! - [pagemap documentation](https://www.kernel.org/doc/Documentation/vm/pagemap.txt)

pub mod inspector;
pub mod maps;
pub mod memory;
pub mod pagemap;
pub mod procinfo;

pub use inspector::LinuxInspector;
use once_cell::sync::Lazy;

static SYSTEM_PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    // SAFETY: sysconf has no preconditions; it only reads a system constant.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).ok().filter(|&s| s > 0).unwrap_or_else(|| {
        tracing::warn!(result = size, "sysconf(_SC_PAGESIZE) failed, assuming 4096");
        4096
    })
});

/// Page size of the running system, in bytes
///
/// Queried once from `sysconf(_SC_PAGESIZE)` and cached.
pub fn page_size() -> usize
{
    *SYSTEM_PAGE_SIZE
}
