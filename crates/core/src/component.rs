//! Component trait and the view tree it renders into

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Closed set of component families the renderer knows how to feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Single-value cards (stat, gauge, sparkline)
    Display,
    Chart,
    Table,
    /// Controls whose changes are dispatched as actions (toggle, slider)
    Actuator,
    Layout,
    Feedback,
    /// Registered at runtime by the embedding application
    Custom,
    /// Stand-in for a type the registry could not resolve
    Placeholder,
}

impl ComponentKind {
    /// Actuators get a boolean `checked` prop and an action binding
    pub fn is_actuator(&self) -> bool {
        matches!(self, ComponentKind::Actuator)
    }
}

/// A rendered component: name, stable key and fully merged props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            key: None,
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_props(mut self, props: Map<String, Value>) -> Self {
        self.props = props;
        self
    }

    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Trait for everything a manifest block can render as
pub trait Component: Send + Sync {
    /// Canonical registry name (e.g. `StatCard`)
    fn name(&self) -> &str;

    fn kind(&self) -> ComponentKind;

    /// Produce the view node for one block
    fn render(&self, key: &str, props: Map<String, Value>) -> ViewNode {
        ViewNode::new(self.name()).with_key(key).with_props(props)
    }
}

/// Type-erased component for dynamic dispatch
pub type BoxedComponent = Arc<dyn Component>;

/// Visible stand-in for a component type that is not registered.
///
/// Carries the requested name and the props that would have been passed,
/// so a misconfigured block shows up on the page instead of vanishing.
#[derive(Debug, Clone)]
pub struct PlaceholderComponent {
    requested: String,
}

/// Component name rendered for unresolved block types
pub const PLACEHOLDER_COMPONENT: &str = "ComponentNotFound";

impl PlaceholderComponent {
    pub fn new(requested: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
        }
    }

    pub fn requested(&self) -> &str {
        &self.requested
    }
}

impl Component for PlaceholderComponent {
    fn name(&self) -> &str {
        PLACEHOLDER_COMPONENT
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Placeholder
    }

    fn render(&self, key: &str, props: Map<String, Value>) -> ViewNode {
        let mut placeholder_props = Map::new();
        placeholder_props.insert("requested".to_string(), Value::from(self.requested.clone()));
        placeholder_props.insert("message".to_string(), Value::from("Component Not Found"));
        placeholder_props.insert("attemptedProps".to_string(), Value::Object(props));
        ViewNode::new(PLACEHOLDER_COMPONENT)
            .with_key(key)
            .with_props(placeholder_props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_carries_request_and_props() {
        let placeholder = PlaceholderComponent::new("FancyGauge");
        let mut props = Map::new();
        props.insert("title".to_string(), json!("Boiler"));

        let node = placeholder.render("b1", props);
        assert_eq!(node.component, PLACEHOLDER_COMPONENT);
        assert_eq!(node.key.as_deref(), Some("b1"));
        assert_eq!(node.props["requested"], json!("FancyGauge"));
        assert_eq!(node.props["attemptedProps"], json!({"title": "Boiler"}));
    }
}
