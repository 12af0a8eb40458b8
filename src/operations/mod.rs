//! Operations module for synchronizing a proxy directory
//!
//! This module provides high-level operations that coordinate:
//! - SyncOperation: prerequisite checks, resolution, stale removal and build
//! - PlanOperation: resolution and diff without side effects
//!
//! The operations coordinate with:
//! - Resolver: selectors to mapping (from resolver module)
//! - Diff: stale proxy detection and removal (from diff module)
//! - Builder: scripts and native stubs (from builder module)
//! - UI: progress reporting (from ui module)

pub mod plan;
pub mod sync;

pub use plan::{PlanOperation, SyncPlan};
pub use sync::{SyncOperation, SyncOptions};
