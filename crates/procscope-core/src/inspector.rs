//! # Inspector Trait
//!
//! The main interface for platform-specific process inspection.
//!
//! This trait defines what the inspector can do, regardless of the kernel
//! interface underneath. Linux implements it with procfs and
//! `process_vm_readv(2)`; see [`crate::platform::linux::LinuxInspector`].
//!
//! Every method is a self-contained snapshot: it opens its own handles to the
//! kernel sources and closes them before returning (or, for the page
//! iterator, when the iterator is dropped). The target keeps running and may
//! remap memory between calls; later calls then fail or skip, they never
//! return stale data as if it were current.

use crate::classify;
use crate::error::InspectResult;
use crate::types::{Address, MemoryReadChunk, MemoryRegion, PageStatus, ProcessId, ProcessInfo, ThreadInfo};

/// Lazy sequence of resident executable pages, borrowed from a region list
pub type PageIter<'a> = Box<dyn Iterator<Item = PageStatus> + 'a>;

/// Main inspection interface
///
/// ## Typical flow
///
/// 1. Create an inspector: `create_inspector(config)`
/// 2. Parse the region list: `memory_regions(pid)`
/// 3. Derive views from it: `shared_libraries(&regions)`, `executable_pages(pid, &regions)`
/// 4. Read raw memory independently: `read_chunk(pid, address)`
pub trait Inspector
{
    /// All processes visible to the caller, sorted by PID
    ///
    /// Processes that exit or deny access while being listed are skipped.
    fn processes(&self) -> InspectResult<Vec<ProcessInfo>>;

    /// All threads of `pid`, sorted by thread id
    ///
    /// ## Errors
    ///
    /// - `ProcessNotFound`: no such process
    fn threads(&self, pid: ProcessId) -> InspectResult<Vec<ThreadInfo>>;

    /// The region list of `pid` in kernel order (ascending start address)
    ///
    /// ## Errors
    ///
    /// - `ProcessNotFound`: the region list cannot be found
    /// - `PermissionDenied`: the region list cannot be opened
    /// - `RegionLimitExceeded`: more regions than the configured bound
    ///
    /// ## Example
    ///
    /// ```rust,no_run
    /// use procscope_core::inspector::create_inspector;
    /// use procscope_core::config::InspectorConfig;
    /// use procscope_core::types::ProcessId;
    ///
    /// let inspector = create_inspector(InspectorConfig::default())?;
    /// for region in inspector.memory_regions(ProcessId::current())? {
    ///     println!("{region}");
    /// }
    /// # Ok::<(), procscope_core::error::InspectError>(())
    /// ```
    fn memory_regions(&self, pid: ProcessId) -> InspectResult<Vec<MemoryRegion>>;

    /// Shared libraries mapped in `regions`, de-duplicated in first-seen order
    fn shared_libraries(&self, regions: &[MemoryRegion]) -> Vec<String>
    {
        classify::list_shared_libraries(regions)
    }

    /// Resident pages of every executable region in `regions`
    ///
    /// The sequence is lazy; dropping it early stops all further reads.
    ///
    /// ## Errors
    ///
    /// - `NoRegions`: `regions` is empty
    /// - `ProcessNotFound` / `PermissionDenied`: page-table metadata cannot be opened
    fn executable_pages<'a>(&self, pid: ProcessId, regions: &'a [MemoryRegion]) -> InspectResult<PageIter<'a>>;

    /// One page-sized read from `pid` at `address`
    ///
    /// An unmapped address is not an error: the chunk comes back empty with
    /// `ReadStatus::AccessFault`.
    ///
    /// ## Errors
    ///
    /// - `PermissionDenied`: the caller may not read the target's memory
    /// - `ProcessNotFound`: no such process
    /// - `ReadFailed`: any other failure
    fn read_chunk(&self, pid: ProcessId, address: Address) -> InspectResult<MemoryReadChunk>;

    /// Size of the blocks returned by [`Inspector::read_chunk`]: the system page size
    fn chunk_size(&self) -> usize;
}

/// Factory function to create the inspector for the current platform
///
/// ## Example
///
/// ```rust,no_run
/// use procscope_core::config::InspectorConfig;
/// use procscope_core::inspector::create_inspector;
/// use procscope_core::types::ProcessId;
///
/// let inspector = create_inspector(InspectorConfig::default())?;
/// let regions = inspector.memory_regions(ProcessId::from(1234))?;
/// println!("{:?}", inspector.shared_libraries(&regions));
/// # Ok::<(), procscope_core::error::InspectError>(())
/// ```
///
/// ## Platform Support
///
/// - Linux: Returns `LinuxInspector`
/// - Others: `Unsupported`
pub fn create_inspector(config: crate::config::InspectorConfig) -> InspectResult<Box<dyn Inspector>>
{
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(crate::platform::linux::LinuxInspector::new(config)))
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = config;
        Err(crate::error::InspectError::Unsupported(format!(
            "process inspection needs procfs, not available on {}",
            std::env::consts::OS
        )))
    }
}
