//! Configuration file handling for pathproxy
//!
//! This module contains:
//! - `path.yml` loading, turned into an ordered list of source selectors
//! - [`Settings`] for one run (directories, compiler, build mode)
//!
//! ```yaml
//! all:
//!   - "c:/miktex/texmfs/install/miktex/bin/"
//! regex:
//!   "c:/Program Files (x86)/Microsoft Visual Studio/2017/Community/VC/Auxiliary/Build":
//!     - .*\.bat$
//! files:
//!   "c:/Program Files/PostgreSQL/10/bin/":
//!     - psql.exe
//!     - pg_dump.exe: pgdump.exe
//! ```

pub mod settings;

pub use settings::{BuildMode, Settings};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::domain::SourceSelector;
use crate::domain::mapping::is_link_name;
use crate::error::{ProxyError, Result};
use crate::path_utils::resolve_against;

/// Default configuration file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "path.yml";

/// On-disk layout of `path.yml`.
///
/// `regex` and `files` stay as raw mappings so their declaration order
/// survives deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    all: Option<OneOrMany>,
    regex: Option<Mapping>,
    files: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileEntry {
    Name(String),
    Aliased(Mapping),
}

/// Parsed `path.yml`
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Selectors in declaration order: `all`, then `regex`, then `files`
    pub selectors: Vec<SourceSelector>,
}

impl ProxyConfig {
    /// Load configuration from a file.
    ///
    /// Relative directories are resolved against the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ProxyError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let yaml = std::fs::read_to_string(path).map_err(|e| ProxyError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_yaml(&yaml, base_dir).map_err(|err| match err {
            ProxyError::ConfigParseFailed { reason, .. } => ProxyError::ConfigParseFailed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = if yaml.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(parse_error)?
        };

        let resolve = |dir: PathBuf| resolve_against(base_dir, &dir);

        let mut selectors = Vec::new();

        for dir in raw.all.map(OneOrMany::into_vec).unwrap_or_default() {
            selectors.push(SourceSelector::directory_scan(resolve(PathBuf::from(dir))));
        }

        for (key, value) in raw.regex.unwrap_or_default() {
            let dir = mapping_key(&key, "regex")?;
            let patterns = serde_yaml::from_value::<OneOrMany>(value)
                .map_err(parse_error)?
                .into_vec()
                .iter()
                .map(|pattern| compile_pattern(&dir, pattern))
                .collect::<Result<Vec<_>>>()?;
            selectors.push(SourceSelector::regex_scan(resolve(PathBuf::from(dir)), patterns));
        }

        for (key, value) in raw.files.unwrap_or_default() {
            let dir = resolve(PathBuf::from(mapping_key(&key, "files")?));
            let entries: Vec<FileEntry> = serde_yaml::from_value(value).map_err(parse_error)?;
            for entry in entries {
                match entry {
                    FileEntry::Name(filename) => {
                        selectors.push(SourceSelector::explicit(
                            dir.clone(),
                            file_name(filename)?,
                            None,
                        ));
                    }
                    FileEntry::Aliased(aliases) => {
                        for (filename, alias) in aliases {
                            selectors.push(SourceSelector::explicit(
                                dir.clone(),
                                file_name(mapping_key(&filename, "files")?)?,
                                Some(file_name(mapping_key(&alias, "files")?)?),
                            ));
                        }
                    }
                }
            }
        }

        Ok(Self { selectors })
    }
}

fn parse_error(err: serde_yaml::Error) -> ProxyError {
    ProxyError::ConfigParseFailed {
        path: DEFAULT_CONFIG_FILE.to_string(),
        reason: err.to_string(),
    }
}

fn mapping_key(value: &Value, section: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProxyError::ConfigParseFailed {
            path: DEFAULT_CONFIG_FILE.to_string(),
            reason: format!("expected a string in '{section}', found {value:?}"),
        })
}

/// Names in 'files' become proxy file names and must not leave their directory
fn file_name(name: String) -> Result<String> {
    if is_link_name(OsStr::new(&name)) {
        Ok(name)
    } else {
        Err(ProxyError::ConfigParseFailed {
            path: DEFAULT_CONFIG_FILE.to_string(),
            reason: format!("'{name}' in 'files' is not a plain file name"),
        })
    }
}

/// Compile a pattern that must match the whole file path
fn compile_pattern(dir: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| ProxyError::InvalidPattern {
        dir: dir.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
