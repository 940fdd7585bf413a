//! Common module for library exports

pub use crate::classify::{is_executable, is_shared_library, list_shared_libraries};
pub use crate::config::InspectorConfig;
pub use crate::error::{InspectError, InspectResult};
pub use crate::format::{format_hexdump, DEFAULT_HEXDUMP_WIDTH};
pub use crate::inspector::{create_inspector, Inspector};
#[cfg(target_os = "linux")]
pub use crate::platform::linux::{page_size, LinuxInspector};
pub use crate::types::{
    Address, MemoryReadChunk, MemoryRegion, PageEntry, PageStatus, Permissions, ProcessId, ProcessInfo, ReadStatus,
    ThreadId, ThreadInfo,
};
