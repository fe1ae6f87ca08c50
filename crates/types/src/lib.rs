//! ramme-types: Shared data types for Ramme dashboards.
//!
//! This crate contains the pure data model (manifest tree, signal
//! definitions and values, workflows, CRUD records) shared by every other
//! crate in the workspace. Nothing here touches storage, clocks or threads.

pub mod manifest;
pub mod record;
pub mod signal;
pub mod workflow;

// Re-export commonly used types at the crate root for convenience
pub use manifest::{
    AppManifest, Block, BlockLayout, Domain, EntityDefinition, EntityUi, ManifestConfig,
    ManifestIssue, ManifestMeta, PageDefinition, PageSection, SectionLayout, DATA_ID_PROP,
    SIGNAL_ID_PROP,
};
pub use record::{Record, RecordId};
pub use signal::{
    map_status, SignalDefinition, SignalKind, SignalSourceKind, SignalStatus, SignalValue,
    UiStatus,
};
pub use workflow::{
    Action, ActionDefinition, Comparison, Condition, FireMode, TriggerConfig, TriggerDefinition,
    WorkflowDefinition, SIGNAL_CHANGE_TRIGGER,
};
