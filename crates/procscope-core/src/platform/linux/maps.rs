//! # Region List Parsing
//!
//! Parses `/proc/<pid>/maps` into [`MemoryRegion`] records.
//!
//! Each line has the shape:
//!
//! ```text
//! 7f8a1000-7f8a2000 r-xp 00001000 08:01 1234567            /usr/lib/libc.so.6
//! start    end      perms offset  dev   inode              [path]
//! ```
//!
//! Only `start`, `end`, `perms` and the path are kept. The path is whatever
//! remains after the fifth field, trimmed, so names with spaces and
//! ` (deleted)` suffixes survive intact. Paths that are not valid UTF-8 are
//! decoded lossily. A line that does not fit the shape is logged and skipped;
//! the rest of the list is still returned.
//!
//! See: [proc_pid_maps(5)](https://man7.org/linux/man-pages/man5/proc_pid_maps.5.html)

use std::fs::File;
use std::io::{BufRead, BufReader};

use tracing::{debug, warn};

use crate::config::InspectorConfig;
use crate::error::{InspectError, InspectResult};
use crate::types::{Address, MemoryRegion, Permissions, ProcessId};

/// Read and parse the region list of `pid`
///
/// ## Errors
///
/// - `ProcessNotFound`: `<proc_root>/<pid>/maps` does not exist
/// - `PermissionDenied`: the file exists but cannot be opened
/// - `SourceUnavailable`: any other open failure
/// - `RegionLimitExceeded`: more than `config.max_regions()` regions
/// - `Io`: the very first line could not be read
pub fn parse_regions(config: &InspectorConfig, pid: ProcessId) -> InspectResult<Vec<MemoryRegion>>
{
    let path = config.process_file(pid.0, "maps");
    let file = File::open(&path).map_err(|e| InspectError::from_open(pid.0, &path, e))?;
    let regions = parse_maps(BufReader::new(file), config.max_regions())?;
    debug!(pid = pid.0, count = regions.len(), "parsed region list");
    Ok(regions)
}

/// Parse a region list from any line-oriented source
///
/// Stops at end of stream. Malformed lines are skipped with a warning;
/// blank lines are ignored. The returned regions keep the input order.
///
/// ## Example
///
/// ```rust
/// use std::io::Cursor;
///
/// use procscope_core::platform::linux::maps::parse_maps;
///
/// let input = "00400000-00401000 r-xp 00000000 08:01 42 /bin/true\n\
///              00600000-00601000 rw-p 00000000 00:00 0\n";
/// let regions = parse_maps(Cursor::new(input), 2048).unwrap();
/// assert_eq!(regions.len(), 2);
/// assert_eq!(regions[0].backing_path, "/bin/true");
/// assert!(regions[1].backing_path.is_empty());
/// ```
pub fn parse_maps<R: BufRead>(mut reader: R, max_regions: usize) -> InspectResult<Vec<MemoryRegion>>
{
    let mut regions = Vec::new();
    let mut skipped = 0usize;
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => line_no += 1,
            Err(e) if line_no == 0 => return Err(InspectError::Io(e)),
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "region list read failed, keeping regions read so far");
                break;
            }
        }

        // Paths are raw bytes; the fixed fields are always ASCII
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        match parse_map_line(line, line_no) {
            Ok(Some(region)) => {
                if regions.len() == max_regions {
                    return Err(InspectError::RegionLimitExceeded { limit: max_regions });
                }
                regions.push(region);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "skipping malformed region line");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, parsed = regions.len(), "region list contained malformed lines");
    }
    Ok(regions)
}

/// Parse one region-list line
///
/// Returns `Ok(None)` for a blank line and `MalformedRecord` when the line
/// does not have the expected shape.
pub fn parse_map_line(line: &str, line_no: usize) -> InspectResult<Option<MemoryRegion>>
{
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut rest = line;
    let mut fields = [""; 5];
    for (i, slot) in fields.iter_mut().enumerate() {
        *slot = next_field(&mut rest)
            .ok_or_else(|| InspectError::malformed(line_no, format!("expected 5 fields, found {i}")))?;
    }
    let [range, perms, offset, dev, inode] = fields;

    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| InspectError::malformed(line_no, format!("address range '{range}' has no '-'")))?;
    let start = parse_hex(start, line_no, "start address")?;
    let end = parse_hex(end, line_no, "end address")?;
    if start >= end {
        return Err(InspectError::malformed(
            line_no,
            format!("start 0x{start:x} is not below end 0x{end:x}"),
        ));
    }

    let permissions: Permissions = perms
        .parse()
        .map_err(|e: InspectError| InspectError::malformed(line_no, e.to_string()))?;

    parse_hex(offset, line_no, "offset")?;

    let (major, minor) = dev
        .split_once(':')
        .ok_or_else(|| InspectError::malformed(line_no, format!("device '{dev}' is not major:minor")))?;
    parse_hex(major, line_no, "device major")?;
    parse_hex(minor, line_no, "device minor")?;

    inode
        .parse::<u64>()
        .map_err(|_| InspectError::malformed(line_no, format!("inode '{inode}' is not decimal")))?;

    Ok(Some(MemoryRegion::new(
        Address::from(start),
        Address::from(end),
        permissions,
        rest.trim().to_string(),
    )))
}

/// Split off the next whitespace-delimited field, advancing `rest` past it.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str>
{
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (field, remainder) = trimmed.split_at(end);
    *rest = remainder;
    Some(field)
}

fn parse_hex(s: &str, line_no: usize, what: &str) -> InspectResult<u64>
{
    u64::from_str_radix(s, 16).map_err(|_| InspectError::malformed(line_no, format!("{what} '{s}' is not hex")))
}
