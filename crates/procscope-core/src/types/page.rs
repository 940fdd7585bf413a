//! Page-table metadata types.
//!
//! Each virtual page of a process has one 64-bit entry in
//! `/proc/<pid>/pagemap`. The bits used here:
//!
//! | bits  | meaning                                   |
//! |-------|-------------------------------------------|
//! | 0-54  | page frame number (when present)         |
//! | 55    | soft-dirty                                |
//! | 56    | page exclusively mapped                   |
//! | 61    | file-page or shared-anon                  |
//! | 62    | swapped                                   |
//! | 63    | present                                   |
//!
//! See: [pagemap documentation](https://www.kernel.org/doc/Documentation/vm/pagemap.txt)

use std::fmt;

use super::Address;

/// Size in bytes of one pagemap entry
pub const PAGEMAP_ENTRY_SIZE: u64 = 8;

/// Bit 63: page present in RAM
pub const PRESENT_BIT: u32 = 63;
/// Bit 62: page swapped out
pub const SWAPPED_BIT: u32 = 62;
/// Bit 61: file-backed page or shared anonymous page
pub const FILE_SHARED_BIT: u32 = 61;
/// Bit 56: page exclusively mapped
pub const EXCLUSIVE_BIT: u32 = 56;
/// Bit 55: soft-dirty
pub const SOFT_DIRTY_BIT: u32 = 55;
/// Mask for bits 0-54 (page frame number)
pub const PFN_MASK: u64 = (1 << 55) - 1;

const fn bit(entry: u64, n: u32) -> bool
{
    (entry >> n) & 1 == 1
}

/// `true` if bit 63 (present) of a raw pagemap entry is set
pub const fn is_present(entry: u64) -> bool
{
    bit(entry, PRESENT_BIT)
}

/// Page frame number held in bits 0-54 of a raw pagemap entry
///
/// Meaningless unless the page is present. Without `CAP_SYS_ADMIN` the
/// kernel reports zero here.
pub const fn frame_number_of(entry: u64) -> u64
{
    entry & PFN_MASK
}

/// `true` if bit 56 (exclusively mapped) of a raw pagemap entry is set
pub const fn is_exclusive(entry: u64) -> bool
{
    bit(entry, EXCLUSIVE_BIT)
}

/// One raw pagemap entry with named accessors
///
/// ## Example
///
/// ```rust
/// use procscope_core::types::PageEntry;
///
/// let entry = PageEntry::new((1 << 63) | (1 << 56) | 0x1234);
/// assert!(entry.is_present());
/// assert!(entry.is_exclusive());
/// assert_eq!(entry.frame_number(), 0x1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PageEntry(u64);

impl PageEntry
{
    /// Wrap a raw entry
    pub const fn new(raw: u64) -> Self
    {
        PageEntry(raw)
    }

    /// Decode an entry from its 8 on-disk bytes (little-endian)
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self
    {
        PageEntry(u64::from_le_bytes(bytes))
    }

    /// Raw 64-bit value
    pub const fn raw(self) -> u64
    {
        self.0
    }

    /// Bit 63
    pub const fn is_present(self) -> bool
    {
        is_present(self.0)
    }

    /// Bits 0-54
    pub const fn frame_number(self) -> u64
    {
        frame_number_of(self.0)
    }

    /// Bit 56
    pub const fn is_exclusive(self) -> bool
    {
        is_exclusive(self.0)
    }

    /// Bit 62
    pub const fn is_swapped(self) -> bool
    {
        bit(self.0, SWAPPED_BIT)
    }

    /// Bit 61
    pub const fn is_file_or_shared_anon(self) -> bool
    {
        bit(self.0, FILE_SHARED_BIT)
    }

    /// Bit 55
    pub const fn is_soft_dirty(self) -> bool
    {
        bit(self.0, SOFT_DIRTY_BIT)
    }
}

impl From<u64> for PageEntry
{
    fn from(raw: u64) -> Self
    {
        PageEntry(raw)
    }
}

/// Decoded physical-mapping state of one resident virtual page
///
/// Produced lazily by the page resolver, one per present page of an
/// executable region. Absent pages are never represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus
{
    /// Page-aligned virtual address
    pub virtual_address: Address,
    /// Bit 63 of the entry; always `true` for emitted records
    pub present: bool,
    /// Physical page frame number (bits 0-54)
    pub frame_number: u64,
    /// Bit 56: not shared with any other process
    pub exclusively_mapped: bool,
    /// Backing path of the owning region
    pub source_path: String,
}

impl PageStatus
{
    /// Build a status record from a raw entry
    pub fn from_entry(virtual_address: Address, entry: PageEntry, source_path: &str) -> Self
    {
        Self {
            virtual_address,
            present: entry.is_present(),
            frame_number: entry.frame_number(),
            exclusively_mapped: entry.is_exclusive(),
            source_path: source_path.to_string(),
        }
    }
}

impl fmt::Display for PageStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "{:X} pfn={} exclusive={} {}",
            self.virtual_address,
            self.frame_number,
            u8::from(self.exclusively_mapped),
            self.source_path
        )
    }
}
