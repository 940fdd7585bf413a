//! # Cross-Process Memory Reads
//!
//! Reads another process's memory with `process_vm_readv(2)`. This needs no
//! ptrace attach and does not stop the target, but it is subject to the same
//! access check as ptrace (same user or `CAP_SYS_PTRACE`, and Yama's
//! `ptrace_scope`).
//!
//! The reader is stateless: [`read_chunk`] performs one page-sized read at the
//! given address. Walking forward is the caller's job; [`MemoryWalk`] is a
//! caller-owned cursor for that.
//!
//! ## Error classification
//!
//! | outcome                        | result                                  |
//! |--------------------------------|-----------------------------------------|
//! | bytes transferred              | `Ok`, `Complete` or `Partial`           |
//! | `EFAULT` or zero bytes         | `Ok`, `AccessFault` with no bytes       |
//! | `EPERM`                        | `Err(PermissionDenied)`                 |
//! | `ESRCH`                        | `Err(ProcessNotFound)`                  |
//! | anything else                  | `Err(ReadFailed)`                       |
//!
//! See: [process_vm_readv(2)](https://man7.org/linux/man-pages/man2/process_vm_readv.2.html)

use std::io;

use tracing::{debug, trace};

use crate::error::{InspectError, InspectResult};
use crate::types::{Address, MemoryReadChunk, ProcessId};

/// Read one block of `len` bytes from `pid` starting at `address`
///
/// `len` is normally the system page size; see [`crate::platform::linux::page_size`].
///
/// ## Errors
///
/// - `PermissionDenied`: the caller may not inspect the target
/// - `ProcessNotFound`: the target does not exist
/// - `ReadFailed`: any other failure of the system call
/// - `InvalidArgument`: `len` is zero or the pid does not fit a `pid_t`
pub fn read_chunk(pid: ProcessId, address: Address, len: usize) -> InspectResult<MemoryReadChunk>
{
    if len == 0 {
        return Err(InspectError::InvalidArgument("read length must be non-zero".to_string()));
    }
    let raw_pid = libc::pid_t::try_from(pid.0)
        .map_err(|_| InspectError::InvalidArgument(format!("PID {} is out of range", pid.0)))?;

    let mut buffer = vec![0u8; len];

    let local = libc::iovec {
        iov_base: buffer.as_mut_ptr().cast(),
        iov_len: len,
    };
    let remote = libc::iovec {
        iov_base: address.value() as usize as *mut libc::c_void,
        iov_len: len,
    };

    // SAFETY: `local` points at `buffer`, which is live and `len` bytes long
    // for the duration of the call. `remote` is only dereferenced by the
    // kernel inside the target's address space.
    let result = unsafe { libc::process_vm_readv(raw_pid, &local, 1, &remote, 1, 0) };

    if result < 0 {
        let err = io::Error::last_os_error();
        return classify_failure(pid, address, err);
    }

    let bytes_read = usize::try_from(result).unwrap_or(0);
    trace!(pid = pid.0, address = %address, bytes_read, "process_vm_readv");
    Ok(MemoryReadChunk::from_buffer(address, buffer, len, bytes_read))
}

fn classify_failure(pid: ProcessId, address: Address, err: io::Error) -> InspectResult<MemoryReadChunk>
{
    match err.raw_os_error() {
        Some(libc::EFAULT) => {
            debug!(pid = pid.0, address = %address, "no accessible memory at address");
            Ok(MemoryReadChunk::access_fault(address))
        }
        Some(libc::EPERM) => Err(InspectError::PermissionDenied(format!(
            "cannot read memory of PID {}: {err}",
            pid.0
        ))),
        Some(libc::ESRCH) => Err(InspectError::ProcessNotFound(pid.0)),
        _ => Err(InspectError::ReadFailed {
            address: address.value(),
            source: err,
        }),
    }
}

/// Caller-owned forward cursor over a target's memory
///
/// Each step calls [`read_chunk`] at the current address and then advances
/// by `bytes_read`. The walk ends after yielding an `AccessFault` chunk,
/// after yielding an error, or when the address would overflow.
///
/// Every call is independent; the walk holds no handle on the target.
///
/// ## Example
///
/// ```rust,no_run
/// use procscope_core::platform::linux::memory::MemoryWalk;
/// use procscope_core::types::{Address, ProcessId};
///
/// let walk = MemoryWalk::new(ProcessId::from(1234), Address::from(0x7f00_0000_0000), 4096);
/// for chunk in walk.take(4) {
///     let chunk = chunk?;
///     println!("{} bytes at {}", chunk.bytes_read, chunk.base_address);
/// }
/// # Ok::<(), procscope_core::error::InspectError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryWalk
{
    pid: ProcessId,
    next: Option<Address>,
    chunk_len: usize,
}

impl MemoryWalk
{
    /// Start a walk at `start`, reading `chunk_len` bytes per step
    pub fn new(pid: ProcessId, start: Address, chunk_len: usize) -> Self
    {
        Self {
            pid,
            next: Some(start),
            chunk_len,
        }
    }

    /// Address the next step will read from, if the walk is not finished
    pub fn position(&self) -> Option<Address>
    {
        self.next
    }
}

impl Iterator for MemoryWalk
{
    type Item = InspectResult<MemoryReadChunk>;

    fn next(&mut self) -> Option<Self::Item>
    {
        let address = self.next.take()?;
        let result = read_chunk(self.pid, address, self.chunk_len);
        if let Ok(chunk) = &result {
            if !chunk.is_access_fault() {
                self.next = chunk.next_address();
            }
        }
        Some(result)
    }
}

/// Walk forward from `start` in page-sized chunks
pub fn walk_memory(pid: ProcessId, start: Address) -> MemoryWalk
{
    MemoryWalk::new(pid, start, super::page_size())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_zero_length_is_rejected()
    {
        let result = read_chunk(ProcessId::current(), Address::from(0x1000), 0);
        assert!(matches!(result, Err(InspectError::InvalidArgument(_))));
    }

    #[test]
    fn test_classify_efault_is_access_fault()
    {
        let err = io::Error::from_raw_os_error(libc::EFAULT);
        let chunk = classify_failure(ProcessId::from(1), Address::from(0x10), err).unwrap();
        assert!(chunk.is_access_fault());
        assert_eq!(chunk.bytes_read, 0);
    }

    #[test]
    fn test_classify_eperm_is_permission_denied()
    {
        let err = io::Error::from_raw_os_error(libc::EPERM);
        let result = classify_failure(ProcessId::from(1), Address::from(0x10), err);
        assert!(matches!(result, Err(InspectError::PermissionDenied(_))));
    }

    #[test]
    fn test_classify_esrch_is_process_not_found()
    {
        let err = io::Error::from_raw_os_error(libc::ESRCH);
        let result = classify_failure(ProcessId::from(77), Address::from(0x10), err);
        assert!(matches!(result, Err(InspectError::ProcessNotFound(77))));
    }

    #[test]
    fn test_classify_other_is_hard_failure()
    {
        let err = io::Error::from_raw_os_error(libc::EINVAL);
        let result = classify_failure(ProcessId::from(1), Address::from(0x10), err);
        assert!(matches!(result, Err(InspectError::ReadFailed { address: 0x10, .. })));
    }

    #[test]
    fn test_walk_reads_own_buffer_then_stops_on_fault()
    {
        let data: Vec<u8> = (0..64u8).collect();
        let start = Address::from(data.as_ptr() as u64);

        let mut walk = MemoryWalk::new(ProcessId::current(), start, 16);
        let first = walk.next().unwrap().unwrap();
        let second = walk.next().unwrap().unwrap();

        assert_eq!(first.bytes, data[..16]);
        assert_eq!(second.base_address, start + 16);
        assert_eq!(second.bytes, data[16..32]);
        assert_eq!(walk.position(), Some(start + 32));
    }

    #[test]
    fn test_walk_ends_after_access_fault()
    {
        let mut walk = MemoryWalk::new(ProcessId::current(), Address::ZERO, 16);
        let chunk = walk.next().unwrap().unwrap();
        assert!(chunk.is_access_fault());
        assert!(walk.next().is_none());
    }
}
