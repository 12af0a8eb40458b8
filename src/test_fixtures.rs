//! Test fixtures shared by unit tests.
//!
//! - [`RecordingReporter`] keeps every reported event for assertions
//! - [`FakeCompiler`] counts invocations and writes the requested output
//! - [`FixedHeaderReader`] answers every subsystem query with one value
//! - [`touch`] creates a file together with its parent directories

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::builder::compiler::CommandOutput;
use crate::builder::{BuildFailure, Compiler};
use crate::domain::ProxyKind;
use crate::inspect::{ExecutableHeaderReader, Subsystem};
use crate::ui::SyncReporter;

/// Create an empty file, creating parent directories as needed.
///
/// # Panics
///
/// Panics if the file cannot be created.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, b"").expect("Failed to create file");
}

/// One reported event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Warning(String),
    Removed(OsString),
    RemovalFailed(OsString),
    Built(OsString, ProxyKind),
    Skipped(OsString),
    Failed(OsString, String),
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(OsString, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Failed(name, message) => Some((name, message)),
                _ => None,
            })
            .collect()
    }
}

impl SyncReporter for RecordingReporter {
    fn warn(&self, message: &str) {
        self.record(Event::Warning(message.to_string()));
    }

    fn removed(&self, link_name: &OsStr) {
        self.record(Event::Removed(link_name.to_os_string()));
    }

    fn removal_failed(&self, link_name: &OsStr, _error: &io::Error) {
        self.record(Event::RemovalFailed(link_name.to_os_string()));
    }

    fn build_started(&self, _total: u64) {}

    fn built(&self, link_name: &OsStr, _source: &Path, kind: ProxyKind) {
        self.record(Event::Built(link_name.to_os_string(), kind));
    }

    fn skipped(&self, link_name: &OsStr) {
        self.record(Event::Skipped(link_name.to_os_string()));
    }

    fn build_failed(&self, link_name: &OsStr, _source: &Path, failure: &BuildFailure) {
        self.record(Event::Failed(link_name.to_os_string(), failure.to_string()));
    }

    fn build_finished(&self) {}
}

/// Compiler double: records argument vectors and fakes the `-o` output
#[derive(Default)]
pub struct FakeCompiler {
    pub fail_with: Option<String>,
    calls: AtomicUsize,
    invocations: Mutex<Vec<Vec<OsString>>>,
}

impl FakeCompiler {
    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<Vec<OsString>> {
        self.invocations.lock().unwrap().clone()
    }
}

impl Compiler for FakeCompiler {
    fn program(&self) -> &Path {
        Path::new("fake-rustc")
    }

    fn compile(&self, args: &[OsString]) -> io::Result<CommandOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(args.to_vec());

        if let Some(stderr) = &self.fail_with {
            return Ok(CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        let output = args
            .iter()
            .position(|arg| arg == "-o")
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from)
            .expect("compiler invoked without -o");
        std::fs::write(output, b"MZ stub")?;
        Ok(CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Header reader double returning one fixed subsystem
pub struct FixedHeaderReader(pub Subsystem);

impl ExecutableHeaderReader for FixedHeaderReader {
    fn subsystem(&self, _path: &Path) -> Subsystem {
        self.0
    }
}
