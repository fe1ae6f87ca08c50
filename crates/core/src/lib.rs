//! ramme-core: Core traits, registry and live state for Ramme dashboards.
//!
//! This crate contains the seams everything else plugs into: the storage
//! and clock abstractions, the component registry, the signal store and the
//! signal source trait.

pub mod clock;
pub mod component;
pub mod constants;
mod registry;
mod signal_source;
pub mod signal_store;
pub mod storage;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use component::{
    BoxedComponent, Component, ComponentKind, PlaceholderComponent, ViewNode,
    PLACEHOLDER_COMPONENT,
};
pub use constants::{
    DEFAULT_SECTION_COLUMNS, DEFAULT_SIMULATION_INTERVAL, DEFAULT_SIMULATION_VARIANCE,
    DEFAULT_STALE_THRESHOLD_MS, DEFAULT_STORAGE_PREFIX, UPDATE_LOOP_BASE_INTERVAL,
};
pub use registry::ComponentRegistry;
pub use signal_source::{BoxedSignalSource, SignalSource, SourceMetadata};
pub use signal_store::{SignalChange, SignalSnapshot, SignalStore, Subscription};
pub use storage::{MemoryStorage, Namespace, Storage, StorageError};

// Re-export types used in trait signatures for convenience
pub use ramme_types::{SignalDefinition, SignalValue};
