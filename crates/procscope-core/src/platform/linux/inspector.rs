//! # Linux Inspector
//!
//! [`Inspector`] implementation on top of procfs and `process_vm_readv(2)`.

use tracing::{debug, info};

use super::{maps, memory, page_size, pagemap, procinfo};
use crate::config::InspectorConfig;
use crate::error::InspectResult;
use crate::inspector::{Inspector, PageIter};
use crate::types::{Address, MemoryReadChunk, MemoryRegion, ProcessId, ProcessInfo, ThreadInfo};

/// Linux process inspector
///
/// Holds only configuration; every call opens and closes its own procfs
/// handles, so one instance can be reused for any number of targets.
///
/// ## Example
///
/// ```rust,no_run
/// use procscope_core::config::InspectorConfig;
/// use procscope_core::platform::linux::LinuxInspector;
/// use procscope_core::types::ProcessId;
/// use procscope_core::Inspector;
///
/// let inspector = LinuxInspector::new(InspectorConfig::default());
/// let regions = inspector.memory_regions(ProcessId::from(1234))?;
/// for page in inspector.executable_pages(ProcessId::from(1234), &regions)? {
///     println!("{page}");
/// }
/// # Ok::<(), procscope_core::error::InspectError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinuxInspector
{
    config: InspectorConfig,
}

impl LinuxInspector
{
    /// Create an inspector with the given configuration
    pub fn new(config: InspectorConfig) -> Self
    {
        debug!(proc_root = %config.proc_root().display(), max_regions = config.max_regions(), "creating inspector");
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &InspectorConfig
    {
        &self.config
    }
}

impl Inspector for LinuxInspector
{
    fn processes(&self) -> InspectResult<Vec<ProcessInfo>>
    {
        procinfo::list_processes(&self.config)
    }

    fn threads(&self, pid: ProcessId) -> InspectResult<Vec<ThreadInfo>>
    {
        procinfo::list_threads(&self.config, pid)
    }

    fn memory_regions(&self, pid: ProcessId) -> InspectResult<Vec<MemoryRegion>>
    {
        maps::parse_regions(&self.config, pid)
    }

    fn executable_pages<'a>(&self, pid: ProcessId, regions: &'a [MemoryRegion]) -> InspectResult<PageIter<'a>>
    {
        let pages = pagemap::resolve_pages(&self.config, pid, regions)?;
        info!(pid = pid.0, regions = regions.len(), "resolving executable pages");
        Ok(Box::new(pages))
    }

    fn read_chunk(&self, pid: ProcessId, address: Address) -> InspectResult<MemoryReadChunk>
    {
        memory::read_chunk(pid, address, page_size())
    }

    fn chunk_size(&self) -> usize
    {
        page_size()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::InspectError;
    use crate::types::ReadStatus;

    #[test]
    fn test_chunk_size_is_page_size()
    {
        let inspector = LinuxInspector::default();
        assert_eq!(inspector.chunk_size(), page_size());
        assert!(inspector.chunk_size().is_power_of_two());
    }

    #[test]
    fn test_own_regions_include_executable()
    {
        let inspector = LinuxInspector::default();
        let regions = inspector.memory_regions(ProcessId::current()).unwrap();
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r.is_executable()));
        assert!(regions.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_executable_pages_rejects_empty_regions()
    {
        let inspector = LinuxInspector::default();
        let result = inspector.executable_pages(ProcessId::current(), &[]);
        assert!(matches!(result, Err(InspectError::NoRegions(_))));
    }

    #[test]
    fn test_read_chunk_of_own_memory()
    {
        let inspector = LinuxInspector::default();
        let data = vec![0x5au8; 64];
        let address = Address::from(data.as_ptr() as u64);

        let chunk = inspector.read_chunk(ProcessId::current(), address).unwrap();
        assert_eq!(chunk.base_address, address);
        assert!(chunk.bytes_read >= 1);
        assert_ne!(chunk.status, ReadStatus::AccessFault);
        assert_eq!(chunk.bytes[0], 0x5a);
    }

    #[test]
    fn test_missing_process_in_fake_root()
    {
        let root = std::env::temp_dir().join(format!("procscope-empty-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let inspector = LinuxInspector::new(InspectorConfig::default().with_proc_root(root.clone()));

        let result = inspector.memory_regions(ProcessId::from(4242));
        assert!(matches!(result, Err(InspectError::ProcessNotFound(4242))));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
