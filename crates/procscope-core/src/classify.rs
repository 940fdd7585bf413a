//! # Region Classification
//!
//! Pure predicates over parsed regions.
//!
//! Shared-library detection is a substring heuristic: any path containing
//! `.so` counts. That deliberately matches versioned names such as
//! `libc.so.6`, and it also matches paths that merely contain `.so`
//! somewhere (e.g. `/opt/app.something/bin`).

use std::collections::HashSet;

use crate::types::MemoryRegion;

/// `true` iff the region's permissions include execute
pub fn is_executable(region: &MemoryRegion) -> bool
{
    region.permissions.execute
}

/// `true` iff `path` contains `.so` anywhere
///
/// ```rust
/// use procscope_core::classify::is_shared_library;
///
/// assert!(is_shared_library("/usr/lib/libc.so.6"));
/// assert!(is_shared_library("/lib/libpthread.so"));
/// assert!(!is_shared_library("/usr/bin/bash"));
/// assert!(!is_shared_library(""));
/// ```
pub fn is_shared_library(path: &str) -> bool
{
    path.contains(".so")
}

/// Shared-library paths in first-seen order, each listed once
///
/// A library mapped as several segments (text, rodata, data) appears once.
pub fn list_shared_libraries(regions: &[MemoryRegion]) -> Vec<String>
{
    let mut seen = HashSet::new();
    regions
        .iter()
        .map(|region| region.backing_path.as_str())
        .filter(|path| is_shared_library(path))
        .filter(|path| seen.insert(*path))
        .map(str::to_string)
        .collect()
}

/// Executable regions, in parse order
pub fn executable_regions(regions: &[MemoryRegion]) -> impl Iterator<Item = &MemoryRegion>
{
    regions.iter().filter(|region| is_executable(region))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::Address;

    fn region(start: u64, perms: &str, path: &str) -> MemoryRegion
    {
        MemoryRegion::new(
            Address::from(start),
            Address::from(start + 0x1000),
            perms.parse().unwrap(),
            path.to_string(),
        )
    }

    #[test]
    fn test_is_executable()
    {
        assert!(is_executable(&region(0x1000, "r-xp", "")));
        assert!(is_executable(&region(0x1000, "--xp", "")));
        assert!(!is_executable(&region(0x1000, "rw-p", "")));
    }

    #[test]
    fn test_substring_match_is_intentionally_lenient()
    {
        assert!(is_shared_library("/opt/app.something/bin/tool"));
        assert!(is_shared_library("/usr/lib/x86_64-linux-gnu/libstdc++.so.6.0.30"));
    }

    #[test]
    fn test_list_shared_libraries_dedups_in_first_seen_order()
    {
        let regions = vec![
            region(0x1000, "r--p", "/lib/a.so"),
            region(0x2000, "r-xp", "/lib/b.so"),
            region(0x3000, "r-xp", "/lib/a.so"),
            region(0x4000, "rw-p", ""),
        ];
        assert_eq!(list_shared_libraries(&regions), vec!["/lib/a.so", "/lib/b.so"]);
    }

    #[test]
    fn test_list_shared_libraries_skips_non_libraries()
    {
        let regions = vec![
            region(0x1000, "r-xp", "/usr/bin/bash"),
            region(0x2000, "rw-p", "[heap]"),
            region(0x3000, "rw-p", "[stack]"),
        ];
        assert!(list_shared_libraries(&regions).is_empty());
    }

    #[test]
    fn test_executable_regions_preserves_order()
    {
        let regions = vec![
            region(0x1000, "r-xp", "/bin/x"),
            region(0x2000, "rw-p", "/bin/x"),
            region(0x3000, "r-xp", "/lib/c.so"),
        ];
        let starts: Vec<u64> = executable_regions(&regions).map(|r| r.start.value()).collect();
        assert_eq!(starts, vec![0x1000, 0x3000]);
    }
}
