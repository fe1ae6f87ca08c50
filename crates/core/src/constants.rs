//! Shared constants for the engine

use std::time::Duration;

/// Age after which a signal value is reported as stale (10 seconds)
pub const DEFAULT_STALE_THRESHOLD_MS: u64 = 10_000;

/// Simulator tick interval
pub const DEFAULT_SIMULATION_INTERVAL: Duration = Duration::from_millis(2000);

/// Maximum absolute change applied to a numeric signal per simulator tick
pub const DEFAULT_SIMULATION_VARIANCE: f64 = 1.0;

/// Storage key prefix for seeded collections
pub const DEFAULT_STORAGE_PREFIX: &str = "ramme_db_";

/// Grid columns used when a section does not declare any
pub const DEFAULT_SECTION_COLUMNS: u32 = 1;

/// Base tick of the update loop; individual jobs run at their own interval
pub const UPDATE_LOOP_BASE_INTERVAL: Duration = Duration::from_millis(100);
