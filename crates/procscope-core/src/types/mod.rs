//! # Types
//!
//! Plain data types shared by every inspection operation.
//!
//! These are produced fresh by each call (region parse, page resolution,
//! memory read) and never mutated afterwards.

pub mod address;
pub mod memory;
pub mod page;
pub mod process;
pub mod region;

// Re-export all public types
pub use address::Address;
pub use memory::{MemoryReadChunk, ReadStatus};
pub use page::{PageEntry, PageStatus};
pub use process::{ProcessId, ProcessInfo, ThreadId, ThreadInfo};
pub use region::{MemoryRegion, Permissions};
