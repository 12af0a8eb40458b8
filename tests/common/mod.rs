//! Common test utilities for pathproxy integration tests

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory holding a config, source programs and the proxy directory
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write `path.yml` in the workspace root
    pub fn write_config(&self, yaml: &str) {
        self.write_file("path.yml", yaml);
    }

    /// Names currently present in the proxy directory
    pub fn links(&self) -> BTreeSet<String> {
        let dir = self.path.join("links");
        if !dir.exists() {
            return BTreeSet::new();
        }
        std::fs::read_dir(dir)
            .expect("Failed to read links directory")
            .map(|entry| {
                entry
                    .expect("Failed to read links entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    /// Command running pathproxy inside the workspace with private scratch space
    pub fn command(&self) -> Command {
        let mut cmd = pathproxy_cmd();
        cmd.current_dir(&self.path)
            .env_remove("PATHPROXY_CONFIG")
            .env_remove("PATHPROXY_LINKS")
            .env_remove("PATHPROXY_COMPILER");
        cmd
    }

    /// `sync` with the object directory kept inside the workspace
    pub fn sync(&self, compiler: &Path) -> Command {
        let mut cmd = self.command();
        cmd.arg("sync")
            .arg("--obj-dir")
            .arg(self.path.join("obj"))
            .arg("--compiler")
            .arg(compiler);
        cmd
    }

    /// Install a fake compiler that writes the `-o` output and logs each call
    #[cfg(unix)]
    pub fn fake_compiler(&self) -> PathBuf {
        self.write_script(
            "toolchain/fake-rustc",
            "#!/bin/sh\n\
             echo \"$@\" >> \"$(dirname \"$0\")/calls.log\"\n\
             out=\"\"\n\
             while [ $# -gt 0 ]; do\n\
             \x20 if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n\
             \x20 shift\n\
             done\n\
             printf 'MZ' > \"$out\"\n",
        )
    }

    /// Install a fake compiler that always fails with a diagnostic
    #[cfg(unix)]
    pub fn failing_compiler(&self) -> PathBuf {
        self.write_script(
            "toolchain/broken-rustc",
            "#!/bin/sh\necho 'error: linker `link.exe` not found' >&2\nexit 1\n",
        )
    }

    /// Number of fake compiler invocations so far
    pub fn compiler_calls(&self) -> usize {
        let log = self.path.join("toolchain").join("calls.log");
        std::fs::read_to_string(log)
            .map(|text| text.lines().count())
            .unwrap_or(0)
    }

    #[cfg(unix)]
    fn write_script(&self, path: &str, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.write_file(path, content);
        let script = self.path.join(path);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        script
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn pathproxy_cmd() -> Command {
    Command::cargo_bin("pathproxy").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("bin/tool.bat", "@echo off");
        assert!(workspace.file_exists("bin/tool.bat"));
        assert_eq!(workspace.read_file("bin/tool.bat"), "@echo off");
    }

    #[test]
    fn test_links_of_fresh_workspace() {
        let workspace = TestWorkspace::new();
        assert!(workspace.links().is_empty());
        assert_eq!(workspace.compiler_calls(), 0);
    }
}
