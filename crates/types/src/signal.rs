//! Signal definitions, live values and status vocabularies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a signal represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    /// A measured value (e.g., temperature)
    #[default]
    Sensor,
    /// A target value the user can change
    Setpoint,
    /// A discrete on/off or enum state
    State,
    /// A business metric (e.g., revenue)
    Metric,
    /// Anything the engine has no special handling for
    Other(String),
}

impl From<String> for SignalKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "sensor" => SignalKind::Sensor,
            "setpoint" => SignalKind::Setpoint,
            "state" => SignalKind::State,
            "metric" => SignalKind::Metric,
            _ => SignalKind::Other(value),
        }
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Sensor => "sensor".to_string(),
            SignalKind::Setpoint => "setpoint".to_string(),
            SignalKind::State => "state".to_string(),
            SignalKind::Metric => "metric".to_string(),
            SignalKind::Other(other) => other,
        }
    }
}

/// Transport a signal's live value arrives through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum SignalSourceKind {
    /// Driven by the local simulator
    #[default]
    Mock,
    /// Pushed by an MQTT broker on `topic`
    Mqtt,
    /// Polled from `endpoint`
    Http,
}

impl From<String> for SignalSourceKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "mqtt" => SignalSourceKind::Mqtt,
            "http" => SignalSourceKind::Http,
            "mock" => SignalSourceKind::Mock,
            other => {
                log::warn!("Unknown signal source '{}', treating as mock", other);
                SignalSourceKind::Mock
            }
        }
    }
}

impl From<SignalSourceKind> for String {
    fn from(kind: SignalSourceKind) -> Self {
        match kind {
            SignalSourceKind::Mock => "mock",
            SignalSourceKind::Mqtt => "mqtt",
            SignalSourceKind::Http => "http",
        }
        .to_string()
    }
}

/// Static declaration of a signal in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: SignalKind,
    #[serde(default)]
    pub source: SignalSourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Dotted path into an HTTP response body (e.g. `data.finance.mrr`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Poll interval in milliseconds (0 or absent = transport default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u64>,
}

impl SignalDefinition {
    /// Create a mock signal definition with only an id and label
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: SignalKind::default(),
            source: SignalSourceKind::default(),
            topic: None,
            endpoint: None,
            path: None,
            unit: None,
            min: None,
            max: None,
            default_value: None,
            refresh_rate: None,
        }
    }

    /// Clamp a numeric value into `[min, max]`, ignoring whichever bound is unset
    pub fn clamp(&self, value: f64) -> f64 {
        let mut clamped = value;
        if let Some(min) = self.min {
            clamped = clamped.max(min);
        }
        if let Some(max) = self.max {
            clamped = clamped.min(max);
        }
        clamped
    }
}

/// A live value held by the signal store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalValue {
    pub value: Value,
    /// Milliseconds since the Unix epoch of the last write
    pub timestamp: u64,
    /// Set when the last transport attempt for this signal failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignalValue {
    pub fn new(value: Value, timestamp: u64) -> Self {
        Self {
            value,
            timestamp,
            error: None,
        }
    }

    /// Derive the freshness status of this value at `now_ms`.
    ///
    /// Staleness is a read-time label; nothing is stored for it.
    pub fn status_at(&self, now_ms: u64, stale_threshold_ms: u64) -> SignalStatus {
        if self.error.is_some() {
            SignalStatus::Error
        } else if now_ms.saturating_sub(self.timestamp) > stale_threshold_ms {
            SignalStatus::Stale
        } else {
            SignalStatus::Fresh
        }
    }
}

/// Internal freshness vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Fresh,
    Stale,
    Disconnected,
    Error,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Fresh => "fresh",
            SignalStatus::Stale => "stale",
            SignalStatus::Disconnected => "disconnected",
            SignalStatus::Error => "error",
        }
    }
}

/// Status vocabulary understood by UI components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiStatus {
    Online,
    Warning,
    Offline,
    Error,
}

impl UiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiStatus::Online => "online",
            UiStatus::Warning => "warning",
            UiStatus::Offline => "offline",
            UiStatus::Error => "error",
        }
    }
}

impl From<SignalStatus> for UiStatus {
    fn from(status: SignalStatus) -> Self {
        map_status(status.as_str())
    }
}

const STATUS_TABLE: &[(&str, UiStatus)] = &[
    ("fresh", UiStatus::Online),
    ("stale", UiStatus::Warning),
    ("disconnected", UiStatus::Offline),
    ("error", UiStatus::Error),
];

/// Map an internal status string to the UI vocabulary.
///
/// Total over all strings: anything not in the table maps to `Offline`.
pub fn map_status(status: &str) -> UiStatus {
    STATUS_TABLE
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, ui)| *ui)
        .unwrap_or(UiStatus::Offline)
}
