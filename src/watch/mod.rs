// src/watch/mod.rs

//! Source-tree polling and change detection.
//!
//! This module is responsible for:
//! - Deciding which files count as sources (`patterns`).
//! - Taking mtime snapshots of the tree (`snapshot`).
//! - Comparing two snapshots (`changes`).
//!
//! It knows nothing about processes; the control loop decides what a change
//! means.

pub mod changes;
pub mod patterns;
pub mod snapshot;

pub use changes::{changed, ChangeSummary};
pub use patterns::ScanFilter;
pub use snapshot::{FileSnapshot, SnapshotScanner};
