//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::settings::{DEFAULT_COMPILER, DEFAULT_LINKS_DIR, default_obj_dir};
use crate::config::{BuildMode, DEFAULT_CONFIG_FILE, Settings};
use crate::ui::{ConsoleReporter, SyncReporter, Verbosity};

/// pathproxy - keep a directory of forwarding proxies in sync
///
/// Put one directory on PATH and let it forward to programs scattered across the disk.
#[derive(Parser, Debug)]
#[command(
    name = "pathproxy",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Keep a directory of forwarding proxies in sync with path.yml",
    long_about = "pathproxy resolves the programs selected in path.yml and keeps one flat \
                  directory of proxies in sync with them: batch files get a forwarding script, \
                  executables get a small compiled stub that relays arguments, standard handles \
                  and the exit code.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  pathproxy sync\n    \
                  pathproxy sync --clean --links c:/tools/links\n    \
                  pathproxy plan --config d:/dotfiles/path.yml"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file
    #[arg(long, short = 'c', global = true, env = "PATHPROXY_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the proxies
    #[arg(long, short = 'l', global = true, env = "PATHPROXY_LINKS", default_value = DEFAULT_LINKS_DIR)]
    pub links: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Print nothing but errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Reporter matching the requested verbosity
    pub fn reporter(&self) -> Box<dyn SyncReporter> {
        Box::new(ConsoleReporter::new(self.verbosity()))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove stale proxies and build missing ones
    Sync(SyncArgs),

    /// Show what sync would change
    Plan,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the sync command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Sync with the defaults (path.yml, ./links):\n    pathproxy sync\n\n\
                  Rebuild every proxy from scratch:\n    pathproxy sync --clean\n\n\
                  Use a specific toolchain and a custom trampoline:\n    \
                  pathproxy sync --compiler c:/rust/bin/rustc.exe --template trampoline.rs")]
pub struct SyncArgs {
    /// Remove every proxy and all scratch data first
    #[arg(long)]
    pub clean: bool,

    /// Scratch directory for generated units
    #[arg(long, value_name = "DIR")]
    pub obj_dir: Option<PathBuf>,

    /// Compiler used for native stubs
    #[arg(long, env = "PATHPROXY_COMPILER", default_value = DEFAULT_COMPILER)]
    pub compiler: PathBuf,

    /// Trampoline source replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Number of parallel builds (defaults to available parallelism)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Build stubs without optimizations and with debug info
    #[arg(long)]
    pub debug: bool,
}

impl SyncArgs {
    /// Settings for a sync run writing into `links_dir`
    pub fn settings(&self, links_dir: PathBuf) -> Settings {
        Settings {
            links_dir,
            obj_dir: self.obj_dir.clone().unwrap_or_else(default_obj_dir),
            compiler: self.compiler.clone(),
            template: self.template.clone(),
            jobs: self.jobs,
            mode: if self.debug {
                BuildMode::Debug
            } else {
                BuildMode::Release
            },
        }
    }
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
