//! Cross-process read results.

use super::Address;

/// Outcome of one read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus
{
    /// The whole requested block was transferred
    Complete,
    /// Fewer bytes than requested; the range ran into an unmapped boundary
    Partial,
    /// Nothing is mapped at the requested address
    ///
    /// This is the normal end of a forward scan, not a failure.
    AccessFault,
}

/// Result of one `read_chunk` call
///
/// Each call produces a fresh chunk owned by the caller; nothing is cached.
/// `bytes` always has length `bytes_read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReadChunk
{
    /// Remote address of the first byte
    pub base_address: Address,
    /// Bytes obtained from the target
    pub bytes: Vec<u8>,
    /// Number of bytes actually read
    pub bytes_read: usize,
    /// Whether the read was complete, partial, or hit an access fault
    pub status: ReadStatus,
}

impl MemoryReadChunk
{
    /// Build a chunk from a buffer of `requested` bytes of which `bytes_read` were filled.
    ///
    /// The buffer is truncated to `bytes_read`.
    pub fn from_buffer(base_address: Address, mut buffer: Vec<u8>, requested: usize, bytes_read: usize) -> Self
    {
        buffer.truncate(bytes_read);
        let status = if bytes_read == 0 {
            ReadStatus::AccessFault
        } else if bytes_read < requested {
            ReadStatus::Partial
        } else {
            ReadStatus::Complete
        };
        Self {
            base_address,
            bytes: buffer,
            bytes_read,
            status,
        }
    }

    /// Empty chunk signalling that `base_address` is unmapped
    pub fn access_fault(base_address: Address) -> Self
    {
        Self {
            base_address,
            bytes: Vec::new(),
            bytes_read: 0,
            status: ReadStatus::AccessFault,
        }
    }

    /// `true` if this chunk marks the end of accessible memory
    pub fn is_access_fault(&self) -> bool
    {
        self.status == ReadStatus::AccessFault
    }

    /// Address one past the last byte read, i.e. where the next read should start
    ///
    /// `None` if that would overflow the address space.
    pub fn next_address(&self) -> Option<Address>
    {
        self.base_address.checked_add(self.bytes_read as u64)
    }
}
