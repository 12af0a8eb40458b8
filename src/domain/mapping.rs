//! Proxy mapping domain types

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use super::selector::{SCRIPT_EXTENSIONS, has_extension};

/// Whether link names differing only in case name the same proxy file
pub const CASE_INSENSITIVE_LINKS: bool = cfg!(windows);

/// True when `name` is a single plain file name, so that joining it onto
/// the proxy directory stays directly inside that directory.
pub fn is_link_name(name: &OsStr) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(first)), None) => first == name,
        _ => false,
    }
}

/// Key under which `name` is stored; case-folded when `case_insensitive`
pub fn fold_link_name(name: &OsStr, case_insensitive: bool) -> OsString {
    match name.to_str() {
        Some(text) if case_insensitive => OsString::from(text.to_lowercase()),
        _ => name.to_os_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    link_name: OsString,
    source: PathBuf,
}

/// Link name (file name inside the proxy directory) to source program path.
///
/// Keys are unique; inserting an existing key replaces its source. Where the
/// proxy directory is case-insensitive, names differing only in case are the
/// same key and the last inserted spelling is kept. Iteration is ordered by
/// key, so equal contents always iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMapping {
    entries: BTreeMap<OsString, Entry>,
}

impl ProxyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(link_name: &OsStr) -> OsString {
        fold_link_name(link_name, CASE_INSENSITIVE_LINKS)
    }

    /// Insert an entry, returning the source it replaced
    pub fn insert(&mut self, link_name: impl Into<OsString>, source: PathBuf) -> Option<PathBuf> {
        let link_name = link_name.into();
        self.entries
            .insert(Self::key(&link_name), Entry { link_name, source })
            .map(|previous| previous.source)
    }

    pub fn get(&self, link_name: &OsStr) -> Option<&Path> {
        self.entries
            .get(&Self::key(link_name))
            .map(|entry| entry.source.as_path())
    }

    pub fn contains(&self, link_name: &OsStr) -> bool {
        self.entries.contains_key(&Self::key(link_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as (link name, source), in key order
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &Path)> {
        self.entries
            .values()
            .map(|entry| (entry.link_name.as_os_str(), entry.source.as_path()))
    }

    pub fn link_names(&self) -> impl Iterator<Item = &OsStr> {
        self.iter().map(|(link_name, _)| link_name)
    }
}

impl<K: Into<OsString>> FromIterator<(K, PathBuf)> for ProxyMapping {
    fn from_iter<I: IntoIterator<Item = (K, PathBuf)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (name, source) in iter {
            mapping.insert(name, source);
        }
        mapping
    }
}

/// How a proxy forwards to its source program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// Fixed-template batch script calling the source
    Script,
    /// Compiled trampoline executable
    NativeStub,
}

impl ProxyKind {
    pub fn of(source: &Path) -> Self {
        if has_extension(source, SCRIPT_EXTENSIONS) {
            ProxyKind::Script
        } else {
            ProxyKind::NativeStub
        }
    }
}
