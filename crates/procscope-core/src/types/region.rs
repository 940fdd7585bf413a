//! Memory region and permission types.

use std::fmt;
use std::str::FromStr;

use super::Address;
use crate::error::InspectError;

/// Access flags of a mapped region
///
/// Parsed from the four-character token in the region list, e.g. `r-xp`:
/// read, write, execute, then `p` (private, copy-on-write) or `s` (shared).
///
/// ## Example
///
/// ```rust
/// use procscope_core::types::Permissions;
///
/// let perms: Permissions = "r-xp".parse().unwrap();
/// assert!(perms.read && perms.execute);
/// assert!(!perms.write && !perms.shared);
/// assert_eq!(perms.to_string(), "r-xp");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions
{
    /// Readable (`r`)
    pub read: bool,
    /// Writable (`w`)
    pub write: bool,
    /// Executable (`x`)
    pub execute: bool,
    /// Shared mapping (`s`); `false` means private (`p`)
    pub shared: bool,
}

impl FromStr for Permissions
{
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(InspectError::InvalidArgument(format!(
                "permission token '{s}' must have 4 characters"
            )));
        }

        let flag = |byte: u8, set: u8| -> Result<bool, InspectError> {
            match byte {
                b if b == set => Ok(true),
                b'-' => Ok(false),
                _ => Err(InspectError::InvalidArgument(format!(
                    "unexpected character '{}' in permission token '{s}'",
                    byte as char
                ))),
            }
        };

        let shared = match bytes[3] {
            b's' => true,
            b'p' => false,
            other => {
                return Err(InspectError::InvalidArgument(format!(
                    "sharing flag '{}' in '{s}' must be 'p' or 's'",
                    other as char
                )))
            }
        };

        Ok(Permissions {
            read: flag(bytes[0], b'r')?,
            write: flag(bytes[1], b'w')?,
            execute: flag(bytes[2], b'x')?,
            shared,
        })
    }
}

impl fmt::Display for Permissions
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// Memory region in a process
///
/// Represents one line of the kernel's region list: a contiguous,
/// page-aligned range of virtual memory with uniform permissions and a single
/// backing object.
///
/// Regions are built fresh on every parse and never mutated afterwards. The
/// parser only ever produces regions with `start < end`.
///
/// ## Examples
///
/// ```
/// use procscope_core::types::{Address, MemoryRegion};
///
/// let code = MemoryRegion::new(
///     Address::from(0x1000),
///     Address::from(0x3000),
///     "r-xp".parse().unwrap(),
///     "/usr/bin/example".to_string(),
/// );
/// assert!(code.is_executable());
/// assert_eq!(code.page_count(0x1000), 2);
///
/// let heap = MemoryRegion::new(
///     Address::from(0x5000),
///     Address::from(0x6000),
///     "rw-p".parse().unwrap(),
///     "[heap]".to_string(),
/// );
/// assert!(heap.is_writable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion
{
    /// Start address of the region (inclusive)
    pub start: Address,

    /// End address of the region (exclusive)
    pub end: Address,

    /// Access flags
    pub permissions: Permissions,

    /// Backing file path or pseudo-name
    ///
    /// An absolute path for file-backed mappings, a bracketed marker such as
    /// `[heap]`, `[stack]` or `[vdso]` for special regions, and empty for
    /// anonymous mappings.
    pub backing_path: String,
}

impl MemoryRegion
{
    /// Create a new memory region
    ///
    /// This does not validate that `end > start`; the region-list parser
    /// rejects such lines before calling it.
    pub fn new(start: Address, end: Address, permissions: Permissions, backing_path: String) -> Self
    {
        Self {
            start,
            end,
            permissions,
            backing_path,
        }
    }

    /// Size of the region in bytes, or 0 if `end <= start`
    pub fn size(&self) -> u64
    {
        self.end.value().saturating_sub(self.start.value())
    }

    /// Number of whole pages covered by the region
    ///
    /// Region boundaries are page-aligned by kernel contract, so no rounding
    /// is applied.
    pub fn page_count(&self, page_size: u64) -> u64
    {
        self.size() / page_size
    }

    /// Check if the region is readable
    pub fn is_readable(&self) -> bool
    {
        self.permissions.read
    }

    /// Check if the region is writable
    pub fn is_writable(&self) -> bool
    {
        self.permissions.write
    }

    /// Check if the region is executable
    pub fn is_executable(&self) -> bool
    {
        self.permissions.execute
    }

    /// Check if the region is a shared (not private) mapping
    pub fn is_shared(&self) -> bool
    {
        self.permissions.shared
    }

    /// `true` if the region has no backing file or pseudo-name
    pub fn is_anonymous(&self) -> bool
    {
        self.backing_path.is_empty()
    }

    /// Check if an address lies within this memory region
    ///
    /// ```rust
    /// use procscope_core::types::{Address, MemoryRegion};
    ///
    /// let region = MemoryRegion::new(
    ///     Address::from(0x1000),
    ///     Address::from(0x2000),
    ///     "rwxp".parse().unwrap(),
    ///     String::new(),
    /// );
    ///
    /// assert!(region.contains(Address::from(0x1000)));
    /// assert!(!region.contains(Address::from(0x2000)));
    /// ```
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end
    }
}

impl fmt::Display for MemoryRegion
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{:x}-{:x} {} {}",
            self.start, self.end, self.permissions, self.backing_path
        )
    }
}
