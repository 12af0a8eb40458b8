//! Plan operation
//!
//! Resolves the configuration and diffs it against the proxy directory
//! without touching the filesystem or requiring a compiler.

use std::collections::BTreeSet;
use std::ffi::OsString;

use crate::config::Settings;
use crate::diff;
use crate::domain::mapping::{CASE_INSENSITIVE_LINKS, fold_link_name};
use crate::domain::{ProxyMapping, SourceSelector};
use crate::error::Result;
use crate::resolver;
use crate::ui::SyncReporter;

use super::sync::read_links;

/// What a sync would do right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub mapping: ProxyMapping,
    /// Proxies that would be deleted
    pub removals: BTreeSet<OsString>,
    /// Link names without a proxy yet
    pub builds: BTreeSet<OsString>,
}

impl SyncPlan {
    /// Link names whose proxy already exists and stays as is
    pub fn unchanged(&self) -> usize {
        self.mapping.len() - self.builds.len()
    }
}

pub struct PlanOperation<'a> {
    settings: &'a Settings,
    reporter: &'a dyn SyncReporter,
}

impl<'a> PlanOperation<'a> {
    pub fn new(settings: &'a Settings, reporter: &'a dyn SyncReporter) -> Self {
        Self { settings, reporter }
    }

    pub fn execute(&self, selectors: &[SourceSelector]) -> Result<SyncPlan> {
        let mapping = resolver::resolve(selectors, self.reporter);
        let existing = read_links(&self.settings.links_dir)?;
        let removals = diff::plan_removals(&mapping, &existing);
        let present: BTreeSet<OsString> = existing
            .iter()
            .map(|name| fold_link_name(name, CASE_INSENSITIVE_LINKS))
            .collect();
        let builds = mapping
            .link_names()
            .filter(|name| !present.contains(&fold_link_name(name, CASE_INSENSITIVE_LINKS)))
            .map(|name| name.to_os_string())
            .collect();

        Ok(SyncPlan {
            mapping,
            removals,
            builds,
        })
    }
}
