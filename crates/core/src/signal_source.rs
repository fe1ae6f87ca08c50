//! Signal source trait

use anyhow::Result;
use std::time::Duration;

use crate::signal_store::SignalStore;

/// Metadata about a signal source
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Unique identifier for this source instance
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Recommended poll interval
    pub default_interval: Duration,
}

/// Trait for everything that writes live values into the signal store.
///
/// Sources are driven by the update manager; each `poll` may write any
/// number of signals.
pub trait SignalSource: Send {
    fn metadata(&self) -> &SourceMetadata;

    /// Produce new values and write them into `store`
    fn poll(&mut self, store: &SignalStore) -> Result<()>;

    /// Check if this source can run in the current configuration
    fn is_available(&self) -> bool {
        true
    }
}

/// Type-erased signal source for dynamic dispatch
pub type BoxedSignalSource = Box<dyn SignalSource>;
