//! Data registry - seeded mock collections addressable by `dataId`.
//!
//! Each collection is persisted as a JSON array under a namespaced storage
//! key. A collection is seeded from the static seed set the first time it is
//! accessed and never again for the lifetime of that storage, so edits made
//! through the CRUD store survive later reads.

use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;

use ramme_core::{Namespace, Storage};

use crate::config::SeedSet;

/// Rows of one collection
pub type Rows = Vec<Value>;

pub struct DataRegistry {
    storage: Arc<dyn Storage>,
    namespace: Namespace,
    seeds: SeedSet,
}

impl DataRegistry {
    pub fn new(storage: Arc<dyn Storage>, namespace: Namespace, seeds: SeedSet) -> Self {
        Self {
            storage,
            namespace,
            seeds,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Seed rows for a collection, if it has any
    pub fn seed(&self, collection: &str) -> Option<&Rows> {
        self.seeds.get(collection)
    }

    /// Resolve a collection by id, seeding it on first access.
    ///
    /// Returns `None` when the collection was never persisted and has no seed.
    /// Unreadable or corrupt stored data falls back to the seed rows for this
    /// access only; the stored value is left for inspection.
    pub fn resolve_data(&self, data_id: &str) -> Option<Rows> {
        let key = self.namespace.key(data_id);
        match self.storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Rows>(&raw) {
                Ok(rows) => return Some(rows),
                Err(e) => {
                    warn!("Collection '{}' holds corrupt JSON ({}), using seed data", data_id, e);
                    return self.seeds.get(data_id).cloned();
                }
            },
            Ok(None) => {}
            Err(e) => {
                error!("Failed to read collection '{}': {}", data_id, e);
                return self.seeds.get(data_id).cloned();
            }
        }

        let Some(seed) = self.seeds.get(data_id) else {
            debug!("No data registered for '{}'", data_id);
            return None;
        };
        info!("Seeding collection: {} ({} records)", data_id, seed.len());
        self.persist(&key, seed);
        Some(seed.clone())
    }

    /// Seed every collection that has not been persisted yet
    pub fn initialize(&self) -> usize {
        let mut seeded = 0;
        for (collection, rows) in &self.seeds {
            let key = self.namespace.key(collection);
            match self.storage.get(&key) {
                Ok(Some(_)) => debug!("Collection exists: {}", collection),
                Ok(None) => {
                    info!("Seeding collection: {} ({} records)", collection, rows.len());
                    if self.persist(&key, rows) {
                        seeded += 1;
                    }
                }
                Err(e) => error!("Failed to inspect collection '{}': {}", collection, e),
            }
        }
        seeded
    }

    /// Drop every seeded collection so the next access re-seeds it
    pub fn reset(&self) {
        for collection in self.seeds.keys() {
            if let Err(e) = self.storage.remove(&self.namespace.key(collection)) {
                error!("Failed to reset collection '{}': {}", collection, e);
            }
        }
        info!("Data lake reset ({} collections)", self.seeds.len());
    }

    /// Collection ids currently persisted under this namespace
    pub fn persisted_collections(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => {
                let mut collections: Vec<String> = keys
                    .iter()
                    .filter_map(|k| self.namespace.collection(k))
                    .map(str::to_string)
                    .collect();
                collections.sort();
                collections
            }
            Err(e) => {
                error!("Failed to list collections: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, key: &str, rows: &Rows) -> bool {
        let encoded = match serde_json::to_string(rows) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode collection '{}': {}", key, e);
                return false;
            }
        };
        match self.storage.set(key, &encoded) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to persist collection '{}': {}", key, e);
                false
            }
        }
    }
}
