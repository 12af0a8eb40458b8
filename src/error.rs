//! Error types and handling for pathproxy
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Only errors that abort the whole run live here. Failures scoped to a single
//! proxy entry or a single stale file are reported and counted where they happen
//! (see [`crate::builder::BuildFailure`]).

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pathproxy operations
#[derive(Error, Diagnostic, Debug)]
pub enum ProxyError {
    // Prerequisite errors
    #[error("Compiler '{compiler}' was not found")]
    #[diagnostic(
        code(pathproxy::prereq::compiler_not_found),
        help("Install a Rust toolchain or point --compiler at a rustc executable")
    )]
    CompilerNotFound { compiler: String },

    #[error("Trampoline template was not found: {path}")]
    #[diagnostic(
        code(pathproxy::prereq::template_not_found),
        help("Omit --template to use the built-in trampoline")
    )]
    TemplateNotFound { path: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(pathproxy::config::not_found),
        help("Create path.yml or pass --config <file>")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(pathproxy::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(pathproxy::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid pattern '{pattern}' for {dir}: {reason}")]
    #[diagnostic(
        code(pathproxy::config::invalid_pattern),
        help("Patterns use regex syntax and must match the whole file path")
    )]
    InvalidPattern {
        dir: String,
        pattern: String,
        reason: String,
    },

    // File system errors
    #[error("Failed to create directory: {path}: {reason}")]
    #[diagnostic(code(pathproxy::fs::create_dir_failed))]
    DirectoryCreateFailed { path: String, reason: String },

    #[error("Failed to read directory: {path}: {reason}")]
    #[diagnostic(code(pathproxy::fs::read_dir_failed))]
    DirectoryReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pathproxy::fs::io_error))]
    IoError { message: String },

    // Scheduling errors
    #[error("Failed to start build workers: {reason}")]
    #[diagnostic(code(pathproxy::build::pool_failed))]
    WorkerPoolFailed { reason: String },
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ProxyError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        ProxyError::WorkerPoolFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ProxyError>;
