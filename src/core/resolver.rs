//! Signal resolution: declaration merged with the live value and its status

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use ramme_core::{SignalSnapshot, SignalStore};
use ramme_types::{AppManifest, SignalStatus, UiStatus};

/// A signal as seen by a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSignal {
    pub value: Value,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub status: SignalStatus,
    pub ui_status: UiStatus,
    pub timestamp: Option<u64>,
}

/// True for `true`, `"true"` and `1`; what actuators read as "on"
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

pub struct SignalResolver {
    manifest: Arc<AppManifest>,
    store: Arc<SignalStore>,
    stale_threshold_ms: u64,
}

impl SignalResolver {
    pub fn new(manifest: Arc<AppManifest>, store: Arc<SignalStore>, stale_threshold_ms: u64) -> Self {
        Self {
            manifest,
            store,
            stale_threshold_ms,
        }
    }

    pub fn stale_threshold_ms(&self) -> u64 {
        self.stale_threshold_ms
    }

    /// Resolve one signal against the current store contents.
    ///
    /// A signal with no value yet is `Disconnected` and carries its
    /// `defaultValue`, or null when it has none or is not declared at all.
    pub fn resolve_signal(&self, signal_id: &str) -> ResolvedSignal {
        let snapshot = self.store.snapshot();
        self.resolve_in(&snapshot, signal_id, self.store.clock().now_ms())
    }

    /// Resolve against a fixed snapshot and time, so a whole page sees one view
    pub fn resolve_in(
        &self,
        snapshot: &SignalSnapshot,
        signal_id: &str,
        now_ms: u64,
    ) -> ResolvedSignal {
        let definition = self.manifest.signal(signal_id);
        let live = snapshot.get(signal_id);

        let (value, status, timestamp) = match live {
            Some(live) => (
                live.value.clone(),
                live.status_at(now_ms, self.stale_threshold_ms),
                Some(live.timestamp),
            ),
            None => (
                definition
                    .and_then(|d| d.default_value.clone())
                    .unwrap_or(Value::Null),
                SignalStatus::Disconnected,
                None,
            ),
        };

        ResolvedSignal {
            value,
            unit: definition.and_then(|d| d.unit.clone()),
            min: definition.and_then(|d| d.min),
            max: definition.and_then(|d| d.max),
            status,
            ui_status: UiStatus::from(status),
            timestamp,
        }
    }
}
