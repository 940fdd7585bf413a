//! # Process and Thread Enumeration
//!
//! Lists processes from the numeric directories of the procfs root and
//! threads from `/proc/<pid>/task`. Identity comes from the `status` file
//! (`Key:\tValue` lines) and the NUL-separated `cmdline` file.
//!
//! Processes come and go while we list them, so a process that vanishes or
//! refuses access halfway through is skipped rather than failing the listing.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::InspectorConfig;
use crate::error::{InspectError, InspectResult};
use crate::types::{ProcessId, ProcessInfo, ThreadId, ThreadInfo};

/// Fields of interest from a `status` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields
{
    /// `Name:`
    pub name: String,
    /// `Tgid:`
    pub tgid: Option<u32>,
    /// `Pid:`
    pub pid: Option<u32>,
}

/// Parse `Key:\tValue` lines of a `status` file
///
/// Unknown keys are ignored and lines without a colon are skipped. Values are
/// decoded lossily, since `Name:` is whatever bytes the process chose.
///
/// ```rust
/// use std::io::Cursor;
///
/// use procscope_core::platform::linux::procinfo::parse_status;
///
/// let status = parse_status(Cursor::new("Name:\tbash\nUmask:\t0022\nTgid:\t812\nPid:\t815\n")).unwrap();
/// assert_eq!(status.name, "bash");
/// assert_eq!(status.tgid, Some(812));
/// assert_eq!(status.pid, Some(815));
/// ```
pub fn parse_status<R: BufRead>(reader: R) -> InspectResult<StatusFields>
{
    let mut fields = StatusFields::default();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let Some((key, value)) = line.split_once(':') else {
            debug!(line = index + 1, "status line without key, skipping");
            continue;
        };
        let value = value.trim();
        match key {
            "Name" => fields.name = value.to_string(),
            "Tgid" => fields.tgid = parse_id(value, index + 1),
            "Pid" => fields.pid = parse_id(value, index + 1),
            _ => {}
        }
    }
    Ok(fields)
}

fn parse_id(value: &str, line_no: usize) -> Option<u32>
{
    match value.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            let err = InspectError::malformed(line_no, format!("'{value}' is not an id"));
            warn!(error = %err, "ignoring status field");
            None
        }
    }
}

/// Turn raw `cmdline` bytes into a display string
///
/// Arguments are NUL-separated; they are joined with single spaces and
/// trailing NULs are dropped. Invalid UTF-8 is replaced.
///
/// ```rust
/// use procscope_core::platform::linux::procinfo::parse_cmdline;
///
/// assert_eq!(parse_cmdline(b"/bin/sleep\x0010\x00"), "/bin/sleep 10");
/// assert_eq!(parse_cmdline(b""), "");
/// ```
pub fn parse_cmdline(bytes: &[u8]) -> String
{
    bytes
        .split(|&b| b == 0)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Identity of a single process
///
/// ## Errors
///
/// - `ProcessNotFound`: the process directory or its `status` is gone
/// - `PermissionDenied` / `SourceUnavailable`: `status` cannot be opened
pub fn read_process_info(config: &InspectorConfig, pid: ProcessId) -> InspectResult<ProcessInfo>
{
    let status = read_status(pid.0, &config.process_file(pid.0, "status"))?;
    let cmdline_path = config.process_file(pid.0, "cmdline");
    let cmdline = match fs::read(&cmdline_path) {
        Ok(bytes) => parse_cmdline(&bytes),
        Err(e) => return Err(InspectError::from_open(pid.0, &cmdline_path, e)),
    };
    Ok(ProcessInfo {
        pid,
        name: status.name,
        cmdline,
    })
}

/// All processes visible under the procfs root, sorted by PID
///
/// ## Errors
///
/// Fails only if the procfs root itself cannot be listed.
pub fn list_processes(config: &InspectorConfig) -> InspectResult<Vec<ProcessInfo>>
{
    let root = config.proc_root();
    let mut processes: Vec<ProcessInfo> = numeric_entries(root)
        .map_err(|e| InspectError::SourceUnavailable {
            path: root.to_path_buf(),
            source: e,
        })?
        .into_iter()
        .filter_map(|pid| match read_process_info(config, ProcessId(pid)) {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(pid, error = %e, "skipping process");
                None
            }
        })
        .collect();
    processes.sort_by_key(|info| info.pid);
    Ok(processes)
}

/// All threads of `pid`, sorted by TID
///
/// ## Errors
///
/// - `ProcessNotFound`: `<proc_root>/<pid>/task` does not exist
/// - `PermissionDenied` / `SourceUnavailable`: it cannot be listed
pub fn list_threads(config: &InspectorConfig, pid: ProcessId) -> InspectResult<Vec<ThreadInfo>>
{
    let task_dir = config.process_file(pid.0, "task");
    let tids = numeric_entries(&task_dir).map_err(|e| InspectError::from_open(pid.0, &task_dir, e))?;

    let mut threads: Vec<ThreadInfo> = tids
        .into_iter()
        .filter_map(|tid| {
            let status_path = task_dir.join(tid.to_string()).join("status");
            match read_status(pid.0, &status_path) {
                Ok(status) => Some(ThreadInfo {
                    tid: ThreadId(tid),
                    tgid: ProcessId(status.tgid.unwrap_or(pid.0)),
                    name: status.name,
                }),
                Err(e) => {
                    debug!(pid = pid.0, tid, error = %e, "skipping thread");
                    None
                }
            }
        })
        .collect();
    threads.sort_by_key(|thread| thread.tid);
    Ok(threads)
}

fn read_status(pid: u32, path: &Path) -> InspectResult<StatusFields>
{
    let file = fs::File::open(path).map_err(|e| InspectError::from_open(pid, path, e))?;
    parse_status(BufReader::new(file))
}

/// Numeric directory entry names of `dir`
fn numeric_entries(dir: &Path) -> std::io::Result<Vec<u32>>
{
    let mut ids = Vec::new();
    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        if let Some(id) = entry.file_name().to_str().and_then(|name| name.parse::<u32>().ok()) {
            ids.push(id);
        }
    }
    Ok(ids)
}
