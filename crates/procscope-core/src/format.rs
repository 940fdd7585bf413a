//! Text rendering helpers for raw memory.

use std::fmt::Write;

use crate::types::Address;

/// Default bytes per hex dump line
pub const DEFAULT_HEXDUMP_WIDTH: usize = 32;

/// Render `bytes` as a hex dump starting at `base`
///
/// Each line is `address: hex bytes  ascii`. `width` is clamped to 8..=32
/// bytes per line; a short last line is padded so the ASCII column lines up.
/// Bytes outside printable ASCII show as `.`.
///
/// ```
/// use procscope_core::format::format_hexdump;
/// use procscope_core::types::Address;
///
/// let dump = format_hexdump(Address::from(0x1000), b"hi", 8);
/// assert!(dump.starts_with("0000000000001000: 68 69"));
/// assert!(dump.trim_end().ends_with("hi"));
/// ```
pub fn format_hexdump(base: Address, bytes: &[u8], width: usize) -> String
{
    let width = width.clamp(8, 32);
    let mut out = String::with_capacity(bytes.len() * 4 + (bytes.len() / width + 1) * 20);

    for (line, chunk) in bytes.chunks(width).enumerate() {
        let addr = base.value().saturating_add((line * width) as u64);
        let _ = write!(out, "{addr:016x}: ");

        for i in 0..width {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
        }

        out.push(' ');
        out.extend(chunk.iter().map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' }));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_hexdump_full_line()
    {
        let bytes: Vec<u8> = (0x41..0x41 + 32).collect();
        let dump = format_hexdump(Address::from(0x7f00_0000_1000), &bytes, DEFAULT_HEXDUMP_WIDTH);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("00007f0000001000: 41 42 43"));
        assert!(lines[0].ends_with("ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`"));
    }

    #[test]
    fn test_hexdump_addresses_advance_by_width()
    {
        let bytes = [0u8; 20];
        let dump = format_hexdump(Address::from(0x1000), &bytes, 8);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0000000000001008:"));
        assert!(lines[2].starts_with("0000000000001010:"));
    }

    #[test]
    fn test_hexdump_pads_short_line_and_masks_non_printable()
    {
        let dump = format_hexdump(Address::from(0), &[0x00, 0x7f, b'a'], 8);
        // 18 chars of address prefix, 8 hex columns of 3, one separator
        let ascii_column = &dump[18 + 8 * 3 + 1..];
        assert_eq!(ascii_column, "..a\n");
    }

    #[test]
    fn test_hexdump_width_is_clamped()
    {
        let bytes = [0xffu8; 64];
        assert_eq!(format_hexdump(Address::from(0), &bytes, 1000).lines().count(), 2);
        assert_eq!(format_hexdump(Address::from(0), &bytes, 1).lines().count(), 8);
    }

    #[test]
    fn test_hexdump_empty()
    {
        assert!(format_hexdump(Address::from(0x1000), &[], 32).is_empty());
    }
}
