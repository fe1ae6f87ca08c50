//! Workflow declarations: triggers, conditions and actions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trigger type that watches a single signal
pub const SIGNAL_CHANGE_TRIGGER: &str = "signal_change";

/// How often a workflow fires while its condition keeps holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// Fire once when the condition becomes true, re-arm once it is false again
    #[default]
    Edge,
    /// Fire on every evaluation while the condition holds
    Continuous,
}

/// A trigger-condition/action rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Inactive workflows are never evaluated
    #[serde(default)]
    pub active: bool,
    pub trigger: TriggerDefinition,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(default)]
    pub config: TriggerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    #[serde(default)]
    pub signal_id: String,
    /// Comparison of the form `<op> <number>`, e.g. `> 80`
    #[serde(default)]
    pub condition: String,
}

/// Raw action entry as written in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Typed view over an [`ActionDefinition`]
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SendNotification { message: Option<String> },
    UpdateResource { config: Map<String, Value> },
    AgentTask { prompt: Option<String> },
    Navigate { path: Option<String> },
    /// Not a built-in action; resolved through registered handlers
    Unknown {
        action_type: String,
        config: Map<String, Value>,
    },
}

impl From<&ActionDefinition> for Action {
    fn from(def: &ActionDefinition) -> Self {
        let string_field = |key: &str| {
            def.config
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        match def.action_type.as_str() {
            "send_notification" => Action::SendNotification {
                message: string_field("message"),
            },
            "update_resource" => Action::UpdateResource {
                config: def.config.clone(),
            },
            "agent_task" => Action::AgentTask {
                prompt: string_field("prompt"),
            },
            "navigate" => Action::Navigate {
                path: string_field("path"),
            },
            other => Action::Unknown {
                action_type: other.to_string(),
                config: def.config.clone(),
            },
        }
    }
}

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
}

impl Comparison {
    fn parse(op: &str) -> Option<Self> {
        match op {
            ">" => Some(Comparison::Greater),
            "<" => Some(Comparison::Less),
            ">=" => Some(Comparison::GreaterOrEqual),
            "<=" => Some(Comparison::LessOrEqual),
            "==" => Some(Comparison::Equal),
            _ => None,
        }
    }
}

/// Parsed `<op> <number>` condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub comparison: Comparison,
    pub target: f64,
}

impl Condition {
    /// Parse a condition string. Returns `None` on any malformed input.
    pub fn parse(condition: &str) -> Option<Self> {
        let mut parts = condition.split_whitespace();
        let comparison = Comparison::parse(parts.next()?)?;
        let target = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() || !target.is_finite() {
            return None;
        }
        Some(Self { comparison, target })
    }

    pub fn is_met(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Greater => value > self.target,
            Comparison::Less => value < self.target,
            Comparison::GreaterOrEqual => value >= self.target,
            Comparison::LessOrEqual => value <= self.target,
            Comparison::Equal => value == self.target,
        }
    }
}
