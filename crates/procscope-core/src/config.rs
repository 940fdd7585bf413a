//! # Inspector Configuration
//!
//! Runtime knobs for the procfs-backed inspector. There are no config files;
//! the CLI fills this in from its flags.

use std::path::{Path, PathBuf};

/// Default procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Default upper bound on regions per parse
///
/// Slightly above the kernel's default `vm.max_map_count` (65530).
pub const DEFAULT_MAX_REGIONS: usize = 65_536;

/// Smallest accepted `max_regions`
pub const MIN_MAX_REGIONS: usize = 2_048;

/// Configuration shared by all inspection operations
///
/// ## Example
///
/// ```rust
/// use procscope_core::config::InspectorConfig;
///
/// let config = InspectorConfig::default().with_max_regions(4096);
/// assert_eq!(config.max_regions(), 4096);
/// assert_eq!(config.proc_root().to_str(), Some("/proc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig
{
    proc_root: PathBuf,
    max_regions: usize,
}

impl Default for InspectorConfig
{
    fn default() -> Self
    {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            max_regions: DEFAULT_MAX_REGIONS,
        }
    }
}

impl InspectorConfig
{
    /// Create a configuration with default values
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Use a different procfs root (for containers with a remapped `/proc`)
    #[must_use]
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self
    {
        self.proc_root = root.into();
        self
    }

    /// Set the region bound; values below [`MIN_MAX_REGIONS`] are raised to it
    #[must_use]
    pub fn with_max_regions(mut self, max_regions: usize) -> Self
    {
        self.max_regions = max_regions.max(MIN_MAX_REGIONS);
        self
    }

    /// Procfs root directory
    pub fn proc_root(&self) -> &Path
    {
        &self.proc_root
    }

    /// Upper bound on regions returned by one parse
    pub fn max_regions(&self) -> usize
    {
        self.max_regions
    }

    /// `<proc_root>/<pid>/<file>`
    pub fn process_file(&self, pid: u32, file: &str) -> PathBuf
    {
        self.proc_root.join(pid.to_string()).join(file)
    }
}
