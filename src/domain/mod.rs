//! Domain models for pathproxy
//!
//! Pure value types shared by the resolver, the diff step and the builder.

pub mod mapping;
pub mod selector;

pub use mapping::{ProxyKind, ProxyMapping};
pub use selector::SourceSelector;
