//! Source selector domain types
//!
//! A selector describes which real programs get a proxy. Selectors are
//! produced by the configuration loader and consumed by the resolver.

use std::path::{Path, PathBuf};

use regex::Regex;

/// Extensions accepted by a plain directory scan (compared case-insensitively)
pub const SCAN_EXTENSIONS: &[&str] = &["exe", "bat", "cmd"];

/// Extensions forwarded by a generated batch script instead of a compiled stub
pub const SCRIPT_EXTENSIONS: &[&str] = &["bat", "cmd"];

/// Declarative description of programs that should get a proxy
#[derive(Debug, Clone)]
pub enum SourceSelector {
    /// Every regular file directly inside `dir` with an allow-listed extension
    DirectoryScan { dir: PathBuf },

    /// Every regular file directly inside `dir` whose full path matches one of `patterns`
    RegexScan { dir: PathBuf, patterns: Vec<Regex> },

    /// One named file, optionally published under a different link name
    ExplicitEntry {
        dir: PathBuf,
        filename: String,
        alias: Option<String>,
    },
}

impl SourceSelector {
    pub fn directory_scan(dir: impl Into<PathBuf>) -> Self {
        Self::DirectoryScan { dir: dir.into() }
    }

    pub fn regex_scan(dir: impl Into<PathBuf>, patterns: Vec<Regex>) -> Self {
        Self::RegexScan {
            dir: dir.into(),
            patterns,
        }
    }

    pub fn explicit(
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        alias: Option<String>,
    ) -> Self {
        Self::ExplicitEntry {
            dir: dir.into(),
            filename: filename.into(),
            alias,
        }
    }

    /// Directory the selector reads from
    pub fn dir(&self) -> &Path {
        match self {
            Self::DirectoryScan { dir }
            | Self::RegexScan { dir, .. }
            | Self::ExplicitEntry { dir, .. } => dir,
        }
    }

    /// Collision priority of the selector kind.
    ///
    /// Selectors are applied in ascending priority, later writes replacing
    /// earlier ones, so an explicit entry beats a regex scan which beats a
    /// directory scan.
    pub fn priority(&self) -> u8 {
        match self {
            Self::DirectoryScan { .. } => 0,
            Self::RegexScan { .. } => 1,
            Self::ExplicitEntry { .. } => 2,
        }
    }
}

/// Compare the extension of `path` against a list, ignoring ASCII case
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
