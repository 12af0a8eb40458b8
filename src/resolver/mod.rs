//! Source resolution
//!
//! Expands source selectors into one [`ProxyMapping`]. Selectors are applied
//! in ascending [`SourceSelector::priority`] (directory scans, then regex
//! scans, then explicit entries) and, within one kind, in declaration order.
//! A later selector producing an existing link name replaces the earlier
//! source, so explicit entries always win a collision.
//!
//! A missing directory is reported and its selector skipped; resolution never
//! fails as a whole.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::domain::mapping::is_link_name;
use crate::domain::selector::{SCAN_EXTENSIONS, has_extension};
use crate::domain::{ProxyMapping, SourceSelector};
use crate::ui::SyncReporter;

/// Resolve `selectors` against the current filesystem state
pub fn resolve(selectors: &[SourceSelector], reporter: &dyn SyncReporter) -> ProxyMapping {
    let mut ordered: Vec<&SourceSelector> = selectors.iter().collect();
    ordered.sort_by_key(|selector| selector.priority());

    let mut mapping = ProxyMapping::new();
    for selector in ordered {
        let dir = selector.dir();
        if !dir.is_dir() {
            reporter.warn(&format!("{} does not exist", dir.display()));
            continue;
        }
        match selector {
            SourceSelector::DirectoryScan { .. } => {
                for path in regular_files(dir, reporter) {
                    if has_extension(&path, SCAN_EXTENSIONS) {
                        insert_by_file_name(&mut mapping, path);
                    }
                }
            }
            SourceSelector::RegexScan { patterns, .. } => {
                for path in regular_files(dir, reporter) {
                    if matches_any(patterns, &path) {
                        insert_by_file_name(&mut mapping, path);
                    }
                }
            }
            SourceSelector::ExplicitEntry { filename, alias, .. } => {
                let link_name = alias.as_deref().unwrap_or(filename);
                if let Some(bad) = [filename.as_str(), link_name]
                    .into_iter()
                    .find(|name| !is_link_name(OsStr::new(name)))
                {
                    reporter.warn(&format!(
                        "'{bad}' in {} is not a plain file name",
                        dir.display()
                    ));
                    continue;
                }
                mapping.insert(link_name, dir.join(filename));
            }
        }
    }
    mapping
}

/// First pattern matching the full path accepts the file
fn matches_any(patterns: &[Regex], path: &Path) -> bool {
    let full_path = path.to_string_lossy();
    patterns.iter().any(|pattern| pattern.is_match(&full_path))
}

fn insert_by_file_name(mapping: &mut ProxyMapping, path: PathBuf) {
    if let Some(name) = path.file_name().map(|n| n.to_os_string()) {
        mapping.insert(name, path);
    }
}

/// Regular files directly inside `dir`, in file name order
fn regular_files(dir: &Path, reporter: &dyn SyncReporter) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                reporter.warn(&format!("cannot read entry in {}: {err}", dir.display()));
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}
