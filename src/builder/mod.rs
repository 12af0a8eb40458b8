//! Proxy building for pathproxy
//!
//! This module handles:
//! - Skipping proxies that already exist in the proxy directory
//! - Writing forwarding scripts for batch sources
//! - Generating, compiling and installing native stubs for everything else
//! - Running one task per mapping entry on a bounded worker pool
//!
//! Every entry is independent. A failing entry is reported through the
//! [`SyncReporter`] and counted; it never stops its siblings.

pub mod compiler;
pub mod script;
pub mod unit;

pub use compiler::{Compiler, locate_compiler};

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::config::BuildMode;
use crate::domain::{ProxyKind, ProxyMapping};
use crate::error::Result;
use crate::inspect::ExecutableHeaderReader;
use crate::path_utils::normalize_source;
use crate::ui::SyncReporter;

/// Why a single proxy could not be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildFailure {
    #[error("source '{}' does not exist", path.display())]
    SourceMissing { path: PathBuf },

    #[error("source path '{}' is not valid Unicode", path.display())]
    NonUnicodePath { path: PathBuf },

    #[error("failed to write script: {reason}")]
    ScriptWrite { reason: String },

    #[error("failed to write unit {}: {reason}", path.display())]
    UnitWrite { path: PathBuf, reason: String },

    #[error("failed to run {}: {reason}", program.display())]
    CompilerSpawn { program: PathBuf, reason: String },

    #[error("{} exited with an error", program.display())]
    CompilerFailed {
        program: PathBuf,
        stdout: String,
        stderr: String,
    },

    #[error("compiler reported success but {} was not produced", path.display())]
    OutputMissing { path: PathBuf },

    #[error("failed to install proxy: {reason}")]
    Install { reason: String },
}

/// What happened to one mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built(ProxyKind),
    Skipped,
    Failed,
}

/// Counts over one build batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub scripts: usize,
    pub stubs: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BuildSummary {
    fn record(mut self, outcome: &BuildOutcome) -> Self {
        match outcome {
            BuildOutcome::Built(ProxyKind::Script) => self.scripts += 1,
            BuildOutcome::Built(ProxyKind::NativeStub) => self.stubs += 1,
            BuildOutcome::Skipped => self.skipped += 1,
            BuildOutcome::Failed => self.failed += 1,
        }
        self
    }

    /// Proxies written in this batch
    pub fn built(&self) -> usize {
        self.scripts + self.stubs
    }
}

/// Builds the proxies of one mapping into a proxy directory
pub struct Builder<'a> {
    /// Directory the proxies are installed into
    target_dir: &'a Path,

    /// Scratch directory for units and staging binaries
    obj_dir: &'a Path,

    /// Trampoline source embedded into every unit
    template: &'a str,

    mode: BuildMode,
    compiler: &'a dyn Compiler,
    headers: &'a dyn ExecutableHeaderReader,
    reporter: &'a dyn SyncReporter,
}

impl<'a> Builder<'a> {
    pub fn new(
        target_dir: &'a Path,
        obj_dir: &'a Path,
        template: &'a str,
        compiler: &'a dyn Compiler,
        headers: &'a dyn ExecutableHeaderReader,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            target_dir,
            obj_dir,
            template,
            mode: BuildMode::default(),
            compiler,
            headers,
            reporter,
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build every entry of `mapping` on `workers` threads.
    ///
    /// Blocks until the whole batch is done. Only failing to start the pool
    /// is an error; entry failures end up in the summary.
    pub fn build(&self, mapping: &ProxyMapping, workers: usize) -> Result<BuildSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("pathproxy-build-{index}"))
            .build()?;

        let entries: Vec<(&OsStr, &Path)> = mapping.iter().collect();
        self.reporter.build_started(entries.len() as u64);

        let outcomes: Vec<BuildOutcome> = pool.install(|| {
            entries
                .par_iter()
                .map(|(link_name, source)| self.build_entry(link_name, source))
                .collect()
        });

        self.reporter.build_finished();
        Ok(outcomes.iter().fold(BuildSummary::default(), BuildSummary::record))
    }

    /// Build a single proxy unless one already exists under `link_name`
    pub fn build_entry(&self, link_name: &OsStr, source: &Path) -> BuildOutcome {
        let output = self.target_dir.join(link_name);
        if fs::symlink_metadata(&output).is_ok() {
            self.reporter.skipped(link_name);
            return BuildOutcome::Skipped;
        }

        match self.write_proxy(link_name, source, &output) {
            Ok(kind) => {
                self.reporter.built(link_name, source, kind);
                BuildOutcome::Built(kind)
            }
            Err(failure) => {
                self.reporter.build_failed(link_name, source, &failure);
                BuildOutcome::Failed
            }
        }
    }

    fn write_proxy(
        &self,
        link_name: &OsStr,
        source: &Path,
        output: &Path,
    ) -> std::result::Result<ProxyKind, BuildFailure> {
        if !source.is_file() {
            return Err(BuildFailure::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        let source = normalize_source(source);
        let kind = ProxyKind::of(&source);
        match kind {
            ProxyKind::Script => {
                script::write_script(output, &source).map_err(|e| BuildFailure::ScriptWrite {
                    reason: e.to_string(),
                })?;
            }
            ProxyKind::NativeStub => self.build_stub(link_name, &source, output)?,
        }
        Ok(kind)
    }

    fn build_stub(
        &self,
        link_name: &OsStr,
        source: &Path,
        output: &Path,
    ) -> std::result::Result<(), BuildFailure> {
        let non_unicode = || BuildFailure::NonUnicodePath {
            path: source.to_path_buf(),
        };
        let target = source.to_str().ok_or_else(non_unicode)?;
        let program_name = source
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(non_unicode)?;

        let unit_path = self.obj_dir.join(with_suffix(link_name, ".rs"));
        let staging_dir = self.obj_dir.join(with_suffix(link_name, ".out"));
        let staged = staging_dir.join(link_name);

        let unit_failure = |path: &Path, e: io::Error| BuildFailure::UnitWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        // Leftovers of an interrupted run must not count as output
        if staging_dir.exists() {
            fs::remove_dir_all(&staging_dir).map_err(|e| unit_failure(&staging_dir, e))?;
        }
        fs::create_dir_all(&staging_dir).map_err(|e| unit_failure(&staging_dir, e))?;
        fs::write(&unit_path, unit::render_unit(target, program_name, self.template))
            .map_err(|e| unit_failure(&unit_path, e))?;

        let subsystem = self.headers.subsystem(source);
        let args = unit::compile_arguments(&unit_path, &staged, subsystem, self.mode);
        let result = self
            .compiler
            .compile(&args)
            .map_err(|e| BuildFailure::CompilerSpawn {
                program: self.compiler.program().to_path_buf(),
                reason: e.to_string(),
            })?;
        if !result.success {
            return Err(BuildFailure::CompilerFailed {
                program: self.compiler.program().to_path_buf(),
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        if !staged.is_file() {
            return Err(BuildFailure::OutputMissing { path: staged });
        }

        install(&staged, output).map_err(|e| BuildFailure::Install {
            reason: e.to_string(),
        })?;
        // Linker side products stay behind otherwise; they are scratch data
        let _ = fs::remove_dir_all(&staging_dir);
        Ok(())
    }
}

fn with_suffix(name: &OsStr, suffix: &str) -> OsString {
    let mut name = name.to_os_string();
    name.push(suffix);
    name
}

/// Move a staged binary into place without replacing an existing proxy.
///
/// A hard link is tried first; a file system that cannot link gets a copy
/// into a freshly created file.
fn install(staged: &Path, output: &Path) -> io::Result<()> {
    match fs::hard_link(staged, output) {
        Ok(()) => return fs::remove_file(staged),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Err(err),
        Err(_) => {}
    }
    let mut source = fs::File::open(staged)?;
    let mut target = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)?;
    let copied = io::copy(&mut source, &mut target)
        .and_then(|_| fs::set_permissions(output, source.metadata()?.permissions()));
    if let Err(err) = copied {
        drop(target);
        let _ = fs::remove_file(output);
        return Err(err);
    }
    fs::remove_file(staged)
}
