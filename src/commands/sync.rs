//! Sync command implementation
//!
//! Loads the configuration, runs the sync operation with console output and
//! prints a one-line summary. Per-entry failures are reported on the way and
//! do not change the exit status.

use console::Style;

use crate::cli::{GlobalArgs, SyncArgs};
use crate::config::ProxyConfig;
use crate::error::Result;
use crate::operations::{SyncOperation, SyncOptions};

/// Run sync command
pub fn run(global: &GlobalArgs, args: SyncArgs) -> Result<()> {
    let proxy_config = ProxyConfig::load(&global.config)?;
    let settings = args.settings(global.links.clone());
    let reporter = global.reporter();

    let summary = SyncOperation::new(&settings, SyncOptions::from(&args), reporter.as_ref())
        .execute(&proxy_config.selectors)?;

    if !global.quiet {
        println!("{} {summary}", Style::new().bold().green().apply_to("Synced:"));
    }
    Ok(())
}
