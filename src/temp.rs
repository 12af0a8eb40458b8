//! Base directory for scratch files (generated units, staging binaries).
//!
//! Never relative: a relative TMPDIR (e.g. `TMPDIR=tmp`) would otherwise put
//! scratch files under whatever directory pathproxy happens to run in.

use std::env;
use std::path::PathBuf;

pub fn temp_dir_base() -> PathBuf {
    let candidate = env::temp_dir();
    if candidate.is_absolute() {
        return candidate;
    }
    #[cfg(windows)]
    {
        ["TEMP", "TMP"]
            .iter()
            .find_map(|var| env::var_os(var).map(PathBuf::from).filter(|p| p.is_absolute()))
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
