//! Process and thread identity types.

use std::fmt;

/// Process identifier (PID)
///
/// A PID is the number the kernel assigns to each running process. Every
/// inspection operation is scoped by one, and it names the per-process
/// directory under the procfs root (`/proc/<pid>`).
///
/// ## Why wrap it in a struct?
///
/// Using a newtype pattern (`struct ProcessId(u32)`) instead of a raw `u32`
/// keeps PIDs apart from thread ids, counts, and the other integers that
/// flow through the same call sites.
///
/// ## Example
///
/// ```rust
/// use procscope_core::types::ProcessId;
///
/// let pid = ProcessId::from(12345);
/// assert_eq!(pid.0, 12345);
/// assert_eq!(pid.to_string(), "12345");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId
{
    /// PID of the calling process
    pub fn current() -> Self
    {
        ProcessId(std::process::id())
    }
}

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Thread identifier (TID)
///
/// On Linux every thread has its own kernel id, listed under
/// `/proc/<pid>/task/<tid>`. The main thread's TID equals the PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub u32);

impl ThreadId
{
    /// Get the raw `u32` thread id
    pub fn raw(&self) -> u32
    {
        self.0
    }
}

impl From<u32> for ThreadId
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

impl fmt::Display for ThreadId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of one process, as listed by process enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo
{
    /// Process id
    pub pid: ProcessId,
    /// Short command name (`Name:` field of `status`)
    pub name: String,
    /// Full command line with arguments joined by spaces
    ///
    /// Empty for kernel threads, which have no user-space argv.
    pub cmdline: String,
}

/// Identity of one thread within a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo
{
    /// Thread id
    pub tid: ThreadId,
    /// Thread group id, i.e. the PID of the owning process
    pub tgid: ProcessId,
    /// Thread name (`Name:` field of the thread's `status`)
    pub name: String,
}
