//! Settings for a single run

use std::path::PathBuf;

/// Compiler used when none is configured
pub const DEFAULT_COMPILER: &str = "rustc";

/// Proxy directory used when none is configured
pub const DEFAULT_LINKS_DIR: &str = "links";

/// Optimization profile of generated stubs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Release,
    Debug,
}

impl BuildMode {
    /// Codegen options passed as `-C <option>`
    pub fn codegen_options(self) -> [&'static str; 2] {
        match self {
            BuildMode::Release => ["opt-level=3", "debuginfo=0"],
            BuildMode::Debug => ["opt-level=0", "debuginfo=2"],
        }
    }
}

/// Everything a sync or plan run needs besides the selectors
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the proxies
    pub links_dir: PathBuf,
    /// Scratch directory for generated units and staging binaries
    pub obj_dir: PathBuf,
    /// Compiler executable name or path
    pub compiler: PathBuf,
    /// Trampoline template overriding the built-in one
    pub template: Option<PathBuf>,
    /// Worker count; `None` means available parallelism
    pub jobs: Option<usize>,
    pub mode: BuildMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            links_dir: PathBuf::from(DEFAULT_LINKS_DIR),
            obj_dir: default_obj_dir(),
            compiler: PathBuf::from(DEFAULT_COMPILER),
            template: None,
            jobs: None,
            mode: BuildMode::default(),
        }
    }
}

impl Settings {
    /// Number of build workers to start
    pub fn worker_count(&self) -> usize {
        self.jobs
            .filter(|&jobs| jobs > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
    }
}

/// `<temp>/pathproxy/obj`
pub fn default_obj_dir() -> PathBuf {
    crate::temp::temp_dir_base().join("pathproxy").join("obj")
}
