//! Command implementations for pathproxy CLI

pub mod completions;
pub mod plan;
pub mod sync;
pub mod version;
