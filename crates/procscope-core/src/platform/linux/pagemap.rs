//! # Page Resolution
//!
//! Resolves executable regions to per-page physical-mapping state using
//! `/proc/<pid>/pagemap`.
//!
//! The pagemap file is a random-access array of 8-byte entries, one per
//! virtual page of the whole address space, indexed by
//! `virtual_address / PAGE_SIZE`. For each executable region we seek to
//! `(start / PAGE_SIZE) * 8` and read one entry per page.
//!
//! Resolution is lazy: [`ExecutablePages`] pulls one entry at a time, so a
//! caller that stops early never touches the rest of the file. A failed seek
//! or read skips that page only.
//!
//! ## Permissions
//!
//! Since Linux 4.0 the frame numbers are zeroed for callers without
//! `CAP_SYS_ADMIN`. The present and exclusive bits are still reported.
//!
//! See: [pagemap documentation](https://www.kernel.org/doc/Documentation/vm/pagemap.txt)

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::num::NonZeroU64;
use std::slice;

use tracing::{trace, warn};

use crate::classify::is_executable;
use crate::config::InspectorConfig;
use crate::error::{InspectError, InspectResult};
use crate::types::page::PAGEMAP_ENTRY_SIZE;
use crate::types::{Address, MemoryRegion, PageEntry, PageStatus, ProcessId};

/// Open the pagemap of `pid` and resolve the executable pages of `regions`
///
/// `regions` should come from a region-list parse of the same process. The
/// process may have changed its layout since; pages that can no longer be
/// read are skipped. Pages are sized by the running system's page size.
///
/// ## Errors
///
/// - `NoRegions`: `regions` is empty
/// - `ProcessNotFound`: the process is gone
/// - `PermissionDenied`: pagemap cannot be opened by this user
/// - `SourceUnavailable`: any other open failure
pub fn resolve_pages<'a>(
    config: &InspectorConfig,
    pid: ProcessId,
    regions: &'a [MemoryRegion],
) -> InspectResult<ExecutablePages<'a, File>>
{
    if regions.is_empty() {
        return Err(InspectError::NoRegions(pid.0));
    }
    let page_size = NonZeroU64::new(super::page_size() as u64)
        .ok_or_else(|| InspectError::InvalidArgument("system page size is zero".to_string()))?;
    let path = config.process_file(pid.0, "pagemap");
    let file = File::open(&path).map_err(|e| InspectError::from_open(pid.0, &path, e))?;
    Ok(ExecutablePages::new(file, regions, page_size))
}

/// Position within the region currently being resolved
#[derive(Debug)]
struct RegionCursor<'a>
{
    path: &'a str,
    address: u64,
    offset: u64,
    remaining: u64,
}

/// Lazy sequence of [`PageStatus`] for every present page of every executable region
///
/// Generic over the pagemap source so it can run against an in-memory buffer.
///
/// ## Example
///
/// ```rust
/// use std::io::Cursor;
/// use std::num::NonZeroU64;
///
/// use procscope_core::platform::linux::pagemap::ExecutablePages;
/// use procscope_core::types::{Address, MemoryRegion};
///
/// let page_size = 4096u64;
/// let region = MemoryRegion::new(
///     Address::from(2 * page_size),
///     Address::from(3 * page_size),
///     "r-xp".parse().unwrap(),
///     "/bin/true".to_string(),
/// );
///
/// // Entries for pages 0, 1, 2; only page 2 belongs to the region.
/// let mut pagemap = Vec::new();
/// for entry in [0u64, 0, (1 << 63) | 0x42] {
///     pagemap.extend_from_slice(&entry.to_le_bytes());
/// }
///
/// let regions = [region];
/// let page_size = NonZeroU64::new(page_size).unwrap();
/// let pages: Vec<_> = ExecutablePages::new(Cursor::new(pagemap), &regions, page_size).collect();
/// assert_eq!(pages.len(), 1);
/// assert_eq!(pages[0].frame_number, 0x42);
/// ```
pub struct ExecutablePages<'a, R>
{
    source: R,
    regions: slice::Iter<'a, MemoryRegion>,
    current: Option<RegionCursor<'a>>,
    page_size: u64,
    skipped: usize,
}

impl<'a, R: Read + Seek> ExecutablePages<'a, R>
{
    /// Resolve pages of `regions` from an already-open pagemap source
    ///
    /// `page_size` must be the page size of the target system.
    pub fn new(source: R, regions: &'a [MemoryRegion], page_size: NonZeroU64) -> Self
    {
        Self {
            source,
            regions: regions.iter(),
            current: None,
            page_size: page_size.get(),
            skipped: 0,
        }
    }

    /// Number of entries that could not be read so far
    pub fn skipped_entries(&self) -> usize
    {
        self.skipped
    }

    fn next_executable_region(&mut self) -> Option<RegionCursor<'a>>
    {
        let page_size = self.page_size;
        self.regions.find(|region| is_executable(region)).map(|region| RegionCursor {
            path: region.backing_path.as_str(),
            address: region.start.value(),
            offset: region.start.page_number(page_size) * PAGEMAP_ENTRY_SIZE,
            remaining: region.page_count(page_size),
        })
    }

    fn read_entry(&mut self, offset: u64) -> io::Result<PageEntry>
    {
        self.source.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; PAGEMAP_ENTRY_SIZE as usize];
        self.source.read_exact(&mut buf)?;
        Ok(PageEntry::from_le_bytes(buf))
    }
}

impl<R: Read + Seek> Iterator for ExecutablePages<'_, R>
{
    type Item = PageStatus;

    fn next(&mut self) -> Option<Self::Item>
    {
        loop {
            let mut cursor = match self.current.take() {
                Some(cursor) => cursor,
                None => self.next_executable_region()?,
            };

            while cursor.remaining > 0 {
                let address = cursor.address;
                let offset = cursor.offset;
                cursor.address = cursor.address.wrapping_add(self.page_size);
                cursor.offset += PAGEMAP_ENTRY_SIZE;
                cursor.remaining -= 1;

                match self.read_entry(offset) {
                    Ok(entry) if entry.is_present() => {
                        trace!(address = format_args!("0x{address:x}"), raw = entry.raw(), "present page");
                        let status = PageStatus::from_entry(Address::from(address), entry, cursor.path);
                        self.current = Some(cursor);
                        return Some(status);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.skipped += 1;
                        warn!(
                            address = format_args!("0x{address:x}"),
                            offset,
                            error = %e,
                            "could not read pagemap entry, skipping page"
                        );
                    }
                }
            }
        }
    }
}
