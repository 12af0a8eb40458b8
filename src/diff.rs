//! Stale proxy detection and removal
//!
//! The removal plan is a pure set difference between the names present in
//! the proxy directory and the link names of the current mapping. Contents
//! are never compared: a proxy whose name is still wanted is kept as is.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io;
use std::path::Path;

use crate::domain::ProxyMapping;
use crate::ui::SyncReporter;

/// Names present in the proxy directory at one point in time
pub type ExistingLinkSet = BTreeSet<OsString>;

/// Outcome of deleting stale proxies
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    pub removed: usize,
    pub failed: usize,
}

/// Snapshot the names directly inside `dir`; a missing directory is empty
pub fn existing_links(dir: &Path) -> io::Result<ExistingLinkSet> {
    if !dir.exists() {
        return Ok(ExistingLinkSet::new());
    }
    std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

/// `existing` minus the link names of `mapping`
pub fn plan_removals(mapping: &ProxyMapping, existing: &ExistingLinkSet) -> BTreeSet<OsString> {
    existing
        .iter()
        .filter(|name| !mapping.contains(name))
        .cloned()
        .collect()
}

/// Delete every planned name from `dir`, reporting each outcome.
///
/// A failed deletion is reported and counted; the remaining removals still run.
pub fn prune(
    dir: &Path,
    removals: &BTreeSet<OsString>,
    reporter: &dyn SyncReporter,
) -> PruneSummary {
    let mut summary = PruneSummary::default();
    for name in removals {
        match std::fs::remove_file(dir.join(name)) {
            Ok(()) => {
                reporter.removed(name);
                summary.removed += 1;
            }
            Err(err) => {
                reporter.removal_failed(name, &err);
                summary.failed += 1;
            }
        }
    }
    summary
}
