//! Sync operation
//!
//! One run brings the proxy directory in line with the configuration:
//! prerequisites are checked first, then sources are resolved, stale proxies
//! are removed and missing proxies are built. Nothing on disk is touched
//! before the prerequisite checks pass.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::builder::{BuildSummary, Builder, Compiler, locate_compiler, unit};
use crate::cli::SyncArgs;
use crate::config::Settings;
use crate::diff::{self, PruneSummary};
use crate::domain::SourceSelector;
use crate::error::{ProxyError, Result};
use crate::inspect::{ExecutableHeaderReader, MappedHeaderReader};
use crate::resolver;
use crate::ui::SyncReporter;

/// Options for sync
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Empty the proxy and object directories before syncing
    pub clean: bool,
}

impl From<&SyncArgs> for SyncOptions {
    fn from(args: &SyncArgs) -> Self {
        Self { clean: args.clean }
    }
}

/// Counts over one sync run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Entries in the resolved mapping
    pub resolved: usize,
    pub removal: PruneSummary,
    pub build: BuildSummary,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resolved, {} removed, {} built ({} scripts, {} stubs), {} up to date, {} failed",
            self.resolved,
            self.removal.removed,
            self.build.built(),
            self.build.scripts,
            self.build.stubs,
            self.build.skipped,
            self.build.failed + self.removal.failed,
        )
    }
}

/// Orchestrates resolve, diff and build for one proxy directory
pub struct SyncOperation<'a> {
    settings: &'a Settings,
    options: SyncOptions,
    reporter: &'a dyn SyncReporter,
}

impl<'a> SyncOperation<'a> {
    pub fn new(settings: &'a Settings, options: SyncOptions, reporter: &'a dyn SyncReporter) -> Self {
        Self {
            settings,
            options,
            reporter,
        }
    }

    /// Run with the configured compiler and the memory-mapped header reader
    pub fn execute(&self, selectors: &[SourceSelector]) -> Result<SyncSummary> {
        let compiler = locate_compiler(&self.settings.compiler)?;
        self.execute_with(selectors, &compiler, &MappedHeaderReader)
    }

    /// Run with explicit capabilities
    pub fn execute_with(
        &self,
        selectors: &[SourceSelector],
        compiler: &dyn Compiler,
        headers: &dyn ExecutableHeaderReader,
    ) -> Result<SyncSummary> {
        let template = unit::load_template(self.settings.template.as_deref())?;
        let links_dir = self.settings.links_dir.as_path();
        let obj_dir = self.settings.obj_dir.as_path();

        let mut summary = SyncSummary::default();
        if self.options.clean {
            summary.removal = self.clean(links_dir, obj_dir)?;
        }
        create_dir(links_dir)?;
        create_dir(obj_dir)?;

        let mapping = resolver::resolve(selectors, self.reporter);
        if mapping.is_empty() {
            self.reporter.warn("the configuration selects no programs");
        }
        summary.resolved = mapping.len();

        let existing = read_links(links_dir)?;
        let removals = diff::plan_removals(&mapping, &existing);
        let pruned = diff::prune(links_dir, &removals, self.reporter);
        summary.removal.removed += pruned.removed;
        summary.removal.failed += pruned.failed;

        summary.build = Builder::new(
            links_dir,
            obj_dir,
            &template,
            compiler,
            headers,
            self.reporter,
        )
        .with_mode(self.settings.mode)
        .build(&mapping, self.settings.worker_count())?;

        Ok(summary)
    }

    /// Remove every proxy and all scratch data
    fn clean(&self, links_dir: &Path, obj_dir: &Path) -> Result<PruneSummary> {
        let removal = diff::prune(links_dir, &read_links(links_dir)?, self.reporter);
        if obj_dir.exists() {
            fs::remove_dir_all(obj_dir).map_err(|e| ProxyError::IoError {
                message: format!("cannot remove {}: {e}", obj_dir.display()),
            })?;
        }
        Ok(removal)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| ProxyError::DirectoryCreateFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn read_links(links_dir: &Path) -> Result<diff::ExistingLinkSet> {
    diff::existing_links(links_dir).map_err(|e| ProxyError::DirectoryReadFailed {
        path: links_dir.display().to_string(),
        reason: e.to_string(),
    })
}
