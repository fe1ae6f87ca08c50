//! Write-through CRUD store over one persisted collection

use log::{error, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use ramme_core::Storage;
use ramme_types::{Record, RecordId};

/// CRUD access to a single collection.
///
/// Every mutation is persisted immediately. If the write fails the change
/// is still applied in memory and the error is logged. Concurrent writers on
/// the same key are not coordinated: the last write wins.
pub struct CrudStore {
    storage: Arc<dyn Storage>,
    key: String,
    items: Vec<Record>,
    /// False when the stored value could not be read; it is never overwritten
    writable: bool,
}

impl CrudStore {
    /// Open a collection, seeding it with `initial` if it was never written.
    ///
    /// Rows are kept whatever their id looks like. Unreadable or corrupt data
    /// falls back to `initial` in memory and the store turns read-only, so
    /// the stored value survives until something else repairs it.
    pub fn open(storage: Arc<dyn Storage>, key: impl Into<String>, initial: Vec<Record>) -> Self {
        let key = key.into();
        let (items, writable) = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Record>>(&raw) {
                Ok(items) => (items, true),
                Err(e) => {
                    warn!(
                        "Collection '{}' is not a record array ({}), opening read-only",
                        key, e
                    );
                    (initial, false)
                }
            },
            Ok(None) => {
                let store = Self {
                    storage,
                    key,
                    items: initial,
                    writable: true,
                };
                store.persist();
                return store;
            }
            Err(e) => {
                error!("Error reading collection '{}', opening read-only: {}", key, e);
                (initial, false)
            }
        };
        Self {
            storage,
            key,
            items,
            writable,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// False if mutations stay in memory because the stored data was unreadable
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.items.iter().find(|r| &r.id == id)
    }

    /// Next id: one past the highest numeric id (text and missing ids count as 0).
    ///
    /// When that would overflow, the smallest positive id not in use is taken.
    fn next_id(&self) -> i64 {
        let highest = self
            .items
            .iter()
            .map(|r| r.id.as_number())
            .fold(0, i64::max);
        highest.checked_add(1).unwrap_or_else(|| {
            let used: HashSet<i64> = self.items.iter().map(|r| r.id.as_number()).collect();
            let id = (1..=i64::MAX).find(|n| !used.contains(n)).unwrap_or_default();
            warn!("Collection '{}' exhausted ids, reusing gap {}", self.key, id);
            id
        })
    }

    /// Append a new record and return it with its assigned id.
    ///
    /// An `id` key inside `fields` is ignored.
    pub fn create(&mut self, mut fields: Map<String, Value>) -> Record {
        fields.remove("id");
        let record = Record::new(self.next_id(), fields);
        self.items.push(record.clone());
        self.persist();
        record
    }

    /// Replace the record with the same id; returns false if none matched
    pub fn update(&mut self, record: Record) -> bool {
        let Some(slot) = self.items.iter_mut().find(|r| r.id == record.id) else {
            warn!("Update ignored: no record {} in '{}'", record.id, self.key);
            return false;
        };
        *slot = record;
        self.persist();
        true
    }

    /// Remove the record with `id`; returns false if none matched
    pub fn delete(&mut self, id: &RecordId) -> bool {
        let before = self.items.len();
        self.items.retain(|r| &r.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        if !self.writable {
            warn!("Collection '{}' is read-only, change kept in memory", self.key);
            return;
        }
        let encoded = match serde_json::to_string(&self.items) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode collection '{}': {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &encoded) {
            error!("Failed to persist collection '{}': {}", self.key, e);
        }
    }
}
