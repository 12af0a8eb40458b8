//! External compiler capability

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProxyError, Result};

/// Result of one compiler invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Something that turns a unit into a binary.
///
/// Invocations run concurrently from the build pool.
pub trait Compiler: Send + Sync {
    /// Program shown in diagnostics
    fn program(&self) -> &Path;

    /// Run the compiler to completion with `args`, capturing its output
    fn compile(&self, args: &[OsString]) -> io::Result<CommandOutput>;
}

/// Compiler backed by a `rustc`-compatible executable
#[derive(Debug, Clone)]
pub struct RustcCompiler {
    program: PathBuf,
}

impl RustcCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Compiler for RustcCompiler {
    fn program(&self) -> &Path {
        &self.program
    }

    fn compile(&self, args: &[OsString]) -> io::Result<CommandOutput> {
        let output = Command::new(&self.program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Find the compiler executable, either a path or a name looked up on `PATH`
pub fn locate_compiler(compiler: &Path) -> Result<RustcCompiler> {
    which::which(compiler)
        .map(RustcCompiler::new)
        .map_err(|_| ProxyError::CompilerNotFound {
            compiler: compiler.display().to_string(),
        })
}
