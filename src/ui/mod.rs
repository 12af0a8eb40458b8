//! Operator-facing output
//!
//! This module handles:
//! - Warnings for skipped selectors
//! - Notices for removed stale proxies
//! - Build progress using indicatif
//! - Dumps of failed builds, including captured compiler output
//!
//! All reporting goes through the SyncReporter trait. Build tasks run on a
//! worker pool and share one reporter, so implementations take `&self` and
//! must keep every message in one piece.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::BuildFailure;
use crate::domain::ProxyKind;

/// Reporter for one synchronization run
pub trait SyncReporter: Send + Sync {
    /// A recoverable problem, e.g. a configured directory that does not exist
    fn warn(&self, message: &str);

    /// A stale proxy was deleted
    fn removed(&self, link_name: &OsStr);

    /// A stale proxy could not be deleted
    fn removal_failed(&self, link_name: &OsStr, error: &io::Error);

    /// The build batch is about to start
    fn build_started(&self, total: u64);

    /// A proxy was written
    fn built(&self, link_name: &OsStr, source: &Path, kind: ProxyKind);

    /// A proxy already existed and was left alone
    fn skipped(&self, link_name: &OsStr);

    /// A single entry failed to build
    fn build_failed(&self, link_name: &OsStr, source: &Path, failure: &BuildFailure);

    /// The build batch completed
    fn build_finished(&self);
}

/// How much a [`ConsoleReporter`] prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only: no warnings, notices or progress
    Quiet,
    #[default]
    Normal,
    /// Every built or already existing proxy as well
    Verbose,
}

/// Console reporter with colored output and a build progress bar
pub struct ConsoleReporter {
    verbosity: Verbosity,
    /// Serializes writers so multi-line dumps never interleave
    output: Mutex<()>,
    progress: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            output: Mutex::new(()),
            progress: Mutex::new(None),
        }
    }

    fn quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    fn verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        self.progress
            .lock()
            .map(|slot| (*slot).clone())
            .unwrap_or_default()
    }

    fn emit(&self, to_stderr: bool, text: &str) {
        let _guard = self.output.lock().unwrap_or_else(|e| e.into_inner());
        let write = || {
            // Output errors (closed pipe) are not worth failing a build over
            if to_stderr {
                let _ = writeln!(io::stderr().lock(), "{text}");
            } else {
                let _ = writeln!(io::stdout().lock(), "{text}");
            }
        };
        match self.progress_bar() {
            Some(pb) => pb.suspend(write),
            None => write(),
        }
    }

    fn tick(&self) {
        if let Some(pb) = self.progress_bar() {
            pb.inc(1);
        }
    }
}

impl SyncReporter for ConsoleReporter {
    fn warn(&self, message: &str) {
        if self.quiet() {
            return;
        }
        self.emit(true, &format!("{} {message}", style("warning:").yellow().bold()));
    }

    fn removed(&self, link_name: &OsStr) {
        if self.quiet() {
            return;
        }
        self.emit(
            false,
            &format!("{} {}", style("removed").cyan(), link_name.to_string_lossy()),
        );
    }

    fn removal_failed(&self, link_name: &OsStr, error: &io::Error) {
        self.emit(
            true,
            &format!(
                "{} cannot remove {}: {error}",
                style("error:").red().bold(),
                link_name.to_string_lossy()
            ),
        );
    }

    fn build_started(&self, total: u64) {
        if self.quiet() {
            return;
        }
        let pb = ProgressBar::new(total);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("#>-"));
        }
        if let Ok(mut slot) = self.progress.lock() {
            *slot = Some(pb);
        }
    }

    fn built(&self, link_name: &OsStr, source: &Path, kind: ProxyKind) {
        if self.verbose() {
            let label = match kind {
                ProxyKind::Script => "script",
                ProxyKind::NativeStub => "stub",
            };
            self.emit(
                false,
                &format!(
                    "{} {} -> {} ({label})",
                    style("built").green(),
                    link_name.to_string_lossy(),
                    source.display()
                ),
            );
        }
        self.tick();
    }

    fn skipped(&self, link_name: &OsStr) {
        if self.verbose() {
            self.emit(
                false,
                &format!("{} {}", style("exists").dim(), link_name.to_string_lossy()),
            );
        }
        self.tick();
    }

    fn build_failed(&self, link_name: &OsStr, source: &Path, failure: &BuildFailure) {
        let mut text = format!(
            "{} building {} from {}: {failure}",
            style("error:").red().bold(),
            link_name.to_string_lossy(),
            source.display()
        );
        if let BuildFailure::CompilerFailed { stdout, stderr, .. } = failure {
            for captured in [stdout, stderr] {
                let captured = captured.trim_end();
                if !captured.is_empty() {
                    text.push('\n');
                    text.push_str(captured);
                }
            }
        }
        self.emit(true, &text);
        self.tick();
    }

    fn build_finished(&self) {
        if let Ok(mut slot) = self.progress.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}
