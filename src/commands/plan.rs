//! Plan command implementation
//!
//! Prints the proxies a sync would remove and build, without requiring a
//! compiler and without touching the proxy directory.

use std::path::Path;

use console::Style;

use crate::cli::GlobalArgs;
use crate::config::{ProxyConfig, Settings};
use crate::error::Result;
use crate::operations::{PlanOperation, SyncPlan};

/// Run plan command
pub fn run(global: &GlobalArgs) -> Result<()> {
    let proxy_config = ProxyConfig::load(&global.config)?;
    let settings = Settings {
        links_dir: global.links.clone(),
        ..Settings::default()
    };
    let reporter = global.reporter();

    let plan = PlanOperation::new(&settings, reporter.as_ref()).execute(&proxy_config.selectors)?;
    display_plan(&settings.links_dir, &plan, global.verbose);
    Ok(())
}

fn display_plan(links_dir: &Path, plan: &SyncPlan, verbose: bool) {
    println!(
        "Plan for {} ({} resolved):",
        Style::new().bold().apply_to(links_dir.display()),
        plan.mapping.len()
    );

    if plan.removals.is_empty() && plan.builds.is_empty() {
        println!("  Nothing to do.");
        return;
    }

    for name in &plan.removals {
        println!(
            "  {} {}",
            Style::new().red().bold().apply_to("remove"),
            name.to_string_lossy()
        );
    }
    for name in &plan.builds {
        let source = plan.mapping.get(name).map(|p| p.display().to_string());
        println!(
            "  {} {} -> {}",
            Style::new().green().bold().apply_to("build "),
            name.to_string_lossy(),
            source.unwrap_or_default()
        );
    }
    if verbose {
        println!("  {} unchanged", plan.unchanged());
    }
}
