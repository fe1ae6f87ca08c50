//! Rows of persisted mock collections

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Record identifier.
///
/// Numeric ids are generated, string ids come from seed data. Rows written by
/// other tools may carry anything else (`2.0`, `null`) or no id at all; those
/// are kept as they are so a rewrite never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
    /// Absent or `null`
    #[default]
    Missing,
    Other(Value),
}

impl RecordId {
    /// Numeric value used when allocating the next id.
    ///
    /// Text and missing ids count as 0; fractional numbers round up.
    pub fn as_number(&self) -> i64 {
        match self {
            RecordId::Number(n) => *n,
            RecordId::Other(value) => value
                .as_f64()
                .filter(|n| n.is_finite())
                .map(|n| n.ceil() as i64)
                .unwrap_or(0),
            RecordId::Text(_) | RecordId::Missing => 0,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RecordId::Missing)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
            RecordId::Missing => write!(f, "<none>"),
            RecordId::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// A single CRUD row: an id plus arbitrary fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "RecordId::is_missing")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
