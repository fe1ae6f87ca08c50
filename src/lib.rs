//! ramme-dash: a manifest-driven dashboard engine
//!
//! This library provides:
//! - Page rendering from a JSON manifest into a serializable view tree
//! - A live signal store fed by a simulator or transport ingest
//! - Seeded mock collections with CRUD over injectable storage
//! - A workflow engine that fires actions when signal conditions hold

pub mod components;
pub mod config;
pub mod core;

// Re-export commonly used types
pub use config::{load_manifest, Settings};
pub use core::{DashboardRuntime, PageView, RuntimeBuilder};
pub use ramme_types::AppManifest;
