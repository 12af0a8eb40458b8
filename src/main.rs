//! pathproxy - keep a directory of forwarding proxies in sync
//!
//! A command line tool that resolves the programs selected in `path.yml` and
//! maintains one flat directory of proxies forwarding to them, so that a
//! single directory on `PATH` exposes tools installed anywhere on disk.

use clap::Parser;

mod builder;
mod cli;
mod commands;
mod config;
mod diff;
mod domain;
mod error;
mod inspect;
mod operations;
mod path_utils;
mod resolver;
mod temp;
mod trampoline;
mod ui;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(&cli.global, args),
        Commands::Plan => commands::plan::run(&cli.global),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
