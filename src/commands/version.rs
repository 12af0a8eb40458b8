//! Version command implementation

use crate::builder::unit::BUILTIN_TEMPLATE;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("pathproxy {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    println!("  Trampoline: {} bytes built in", BUILTIN_TEMPLATE.len());

    Ok(())
}

fn rustc_version() -> &'static str {
    // Minimum supported version from the manifest
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
