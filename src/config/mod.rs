//! Configuration management

mod seeds;
mod settings;

pub use seeds::{default_seeds, SeedSet};
pub use settings::{Settings, SETTINGS_VERSION};

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

use ramme_types::AppManifest;

/// Load a manifest from a JSON file and log any structural issues
pub fn load_manifest(path: &Path) -> Result<AppManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest = AppManifest::from_json(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

    info!(
        "Loaded manifest '{}' v{} ({} signals, {} pages)",
        manifest.meta.name,
        manifest.meta.version,
        manifest.domain.signals.len(),
        manifest.pages.len()
    );
    for issue in manifest.validate() {
        warn!("Manifest issue: {}", issue);
    }
    Ok(manifest)
}
