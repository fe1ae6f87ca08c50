//! Key-value storage abstraction for persisted collections.
//!
//! Every persisted byte goes through [`Storage`], so the seeder and the CRUD
//! store can run against [`MemoryStorage`] in tests and against a file or
//! embedded backend in production without touching call sites.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use crate::constants::DEFAULT_STORAGE_PREFIX;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage
pub trait Storage: Send + Sync {
    /// Read a key; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every stored key
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory storage, the default for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("memory storage lock poisoned".to_string())
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}

/// Maps collection ids onto prefixed storage keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Storage key for a collection, e.g. `ramme_db_invoices`
    pub fn key(&self, collection: &str) -> String {
        format!("{}{}", self.prefix, collection)
    }

    /// Collection id for a storage key, if the key belongs to this namespace
    pub fn collection<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_PREFIX)
    }
}
