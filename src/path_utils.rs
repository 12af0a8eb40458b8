//! Path helpers shared by the builder and the orchestrator

use std::path::{Path, PathBuf};

use normpath::PathExt;

/// Absolute, normalized form of a source path as embedded into proxies.
///
/// Falls back to a purely lexical absolute path when the filesystem cannot
/// resolve it. Verbatim (`\\?\`) prefixes are stripped where that is lossless.
pub fn normalize_source(path: &Path) -> PathBuf {
    let normalized = match path.normalize() {
        Ok(norm) => norm.into_path_buf(),
        Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    };
    dunce::simplified(&normalized).to_path_buf()
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
