//! Integration tests against the live procfs
//!
//! Every test inspects the test process itself, which needs no extra
//! privileges. Frame numbers read back as zero without `CAP_SYS_ADMIN`, so
//! the page tests check presence and placement, not frame values.

#![cfg(target_os = "linux")]

use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use procscope_core::config::InspectorConfig;
use procscope_core::error::InspectError;
use procscope_core::inspector::create_inspector;
use procscope_core::platform::linux::maps::parse_maps;
use procscope_core::platform::linux::memory::{read_chunk, walk_memory, MemoryWalk};
use procscope_core::platform::linux::{page_size, LinuxInspector};
use procscope_core::types::{Address, ProcessId, ReadStatus};
use procscope_core::Inspector;

fn inspector() -> LinuxInspector
{
    LinuxInspector::new(InspectorConfig::default())
}

#[test]
fn test_parsing_same_snapshot_twice_is_identical()
{
    let snapshot = fs::read_to_string(format!("/proc/{}/maps", std::process::id())).unwrap();
    let max = InspectorConfig::default().max_regions();

    let first = parse_maps(Cursor::new(snapshot.as_bytes()), max).unwrap();
    let second = parse_maps(Cursor::new(snapshot.as_bytes()), max).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), snapshot.lines().filter(|l| !l.trim().is_empty()).count());
}

#[test]
fn test_two_parses_of_idle_process_agree()
{
    let mut child = Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    // Let the dynamic loader finish mapping
    thread::sleep(Duration::from_millis(200));

    let pid = ProcessId::from(child.id());
    let inspector = inspector();
    let first = inspector.memory_regions(pid);
    let second = inspector.memory_regions(pid);

    child.kill().unwrap();
    child.wait().unwrap();

    let first = first.unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second.unwrap());
}

#[test]
fn test_own_regions_contain_test_binary()
{
    let regions = inspector().memory_regions(ProcessId::current()).unwrap();
    let exe = std::env::current_exe().unwrap();
    let exe_name = exe.file_name().unwrap().to_string_lossy().into_owned();

    assert!(regions
        .iter()
        .any(|r| r.is_executable() && r.backing_path.ends_with(&exe_name)));
    for region in &regions {
        assert!(region.start < region.end);
        assert!(region.start.is_page_aligned(page_size() as u64));
    }
}

#[test]
fn test_own_shared_libraries_are_unique_shared_objects()
{
    let inspector = inspector();
    let regions = inspector.memory_regions(ProcessId::current()).unwrap();
    let libraries = inspector.shared_libraries(&regions);

    let unique: HashSet<&String> = libraries.iter().collect();
    assert_eq!(unique.len(), libraries.len());
    assert!(libraries.iter().all(|l| l.contains(".so")));
}

#[test]
fn test_own_executable_pages_are_resident_and_in_bounds()
{
    let inspector = inspector();
    let regions = inspector.memory_regions(ProcessId::current()).unwrap();
    let page = page_size() as u64;

    let pages: Vec<_> = inspector
        .executable_pages(ProcessId::current(), &regions)
        .unwrap()
        .collect();

    // The code running this test is mapped and resident
    assert!(!pages.is_empty());
    for status in &pages {
        assert!(status.present);
        assert!(status.virtual_address.is_page_aligned(page));
        assert!(regions
            .iter()
            .any(|r| r.is_executable() && r.contains(status.virtual_address)));
    }
}

#[test]
fn test_executable_pages_can_stop_early()
{
    let inspector = inspector();
    let regions = inspector.memory_regions(ProcessId::current()).unwrap();
    let pages: Vec<_> = inspector
        .executable_pages(ProcessId::current(), &regions)
        .unwrap()
        .take(1)
        .collect();
    assert_eq!(pages.len(), 1);
}

#[test]
fn test_executable_pages_without_regions()
{
    let result = inspector().executable_pages(ProcessId::current(), &[]);
    assert!(matches!(result, Err(InspectError::NoRegions(_))));
}

#[test]
fn test_consecutive_reads_are_contiguous()
{
    let data: Vec<u8> = (0..3072u32).map(|i| (i % 251) as u8).collect();
    let start = Address::from(data.as_ptr() as u64);

    let mut collected = Vec::new();
    let mut walk = MemoryWalk::new(ProcessId::current(), start, 1024);
    for _ in 0..3 {
        let chunk = walk.next().unwrap().unwrap();
        assert_eq!(chunk.status, ReadStatus::Complete);
        assert_eq!(chunk.base_address, Address::from(start.value() + collected.len() as u64));
        collected.extend_from_slice(&chunk.bytes);
    }

    assert_eq!(collected, data);
    assert_eq!(walk.position(), Some(Address::from(start.value() + 3072)));
}

#[test]
fn test_read_across_unreadable_boundary_is_partial()
{
    let page = page_size();

    // SAFETY: fresh anonymous mapping of two pages; only touched below and
    // unmapped at the end of the test.
    let base = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            2 * page,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    assert_ne!(base, libc::MAP_FAILED);
    // SAFETY: the first page is mapped read-write; the second page is ours and
    // is made inaccessible so no other allocation can land there.
    unsafe {
        std::ptr::write_bytes(base.cast::<u8>(), 0xab, page);
        assert_eq!(libc::mprotect(base.cast::<u8>().add(page).cast(), page, libc::PROT_NONE), 0);
    }

    let half = page / 2;
    let start = Address::from(base as u64 + half as u64);
    let chunk = inspector().read_chunk(ProcessId::current(), start).unwrap();
    let next = chunk.next_address().map(|a| inspector().read_chunk(ProcessId::current(), a).unwrap());

    // SAFETY: unmapping exactly the region mapped above.
    unsafe {
        libc::munmap(base, 2 * page);
    }

    assert_eq!(chunk.status, ReadStatus::Partial);
    assert_eq!(chunk.bytes_read, page - half);
    assert!(chunk.bytes.iter().all(|&b| b == 0xab));
    assert_eq!(chunk.next_address(), Some(Address::from(base as u64 + page as u64)));
    assert!(next.unwrap().is_access_fault());
}

#[test]
fn test_read_at_null_is_access_fault()
{
    let chunk = inspector()
        .read_chunk(ProcessId::current(), Address::from(0))
        .unwrap();
    assert!(chunk.is_access_fault());
    assert_eq!(chunk.bytes_read, 0);
    assert!(chunk.bytes.is_empty());
}

#[test]
fn test_walk_ends_after_access_fault()
{
    let mut walk = walk_memory(ProcessId::current(), Address::from(0));
    let first = walk.next().unwrap().unwrap();
    assert!(first.is_access_fault());
    assert!(walk.next().is_none());
    assert_eq!(walk.position(), None);
}

#[test]
fn test_read_from_missing_process()
{
    // Above any pid_max the kernel allows
    let result = read_chunk(ProcessId::from(0x3fff_fff0), Address::from(0x1000), 16);
    assert!(matches!(result, Err(InspectError::ProcessNotFound(0x3fff_fff0))));
}

#[test]
fn test_regions_of_missing_process()
{
    let result = inspector().memory_regions(ProcessId::from(u32::MAX));
    assert!(matches!(result, Err(InspectError::ProcessNotFound(u32::MAX))));
}

#[test]
fn test_own_threads_include_main_thread()
{
    let pid = ProcessId::current();
    let threads = inspector().threads(pid).unwrap();

    assert!(threads.iter().any(|t| t.tid.raw() == pid.0));
    assert!(threads.iter().all(|t| t.tgid == pid));
    assert!(threads.windows(2).all(|w| w[0].tid < w[1].tid));
}

#[test]
fn test_processes_include_self()
{
    let inspector = create_inspector(InspectorConfig::default()).unwrap();
    let processes = inspector.processes().unwrap();

    let me = processes
        .iter()
        .find(|p| p.pid == ProcessId::current())
        .unwrap();
    assert!(!me.name.is_empty());
    assert!(processes.windows(2).all(|w| w[0].pid < w[1].pid));
}
