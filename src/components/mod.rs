//! Built-in components
//!
//! The engine does not draw anything itself: each built-in is a named view
//! node with a known [`ComponentKind`], which tells the renderer how to feed
//! it. The UI layer maps names to its own widgets.

use serde_json::{Map, Value};
use std::sync::Arc;

use ramme_core::{Component, ComponentKind, ComponentRegistry, ViewNode};

/// A component known to the engine by name and kind only
#[derive(Debug, Clone, Copy)]
pub struct BuiltinComponent {
    name: &'static str,
    kind: ComponentKind,
}

impl BuiltinComponent {
    pub const fn new(name: &'static str, kind: ComponentKind) -> Self {
        Self { name, kind }
    }
}

/// Column names taken from the fields of the first row
fn infer_columns(rows: &[Value]) -> Option<Value> {
    let first = rows.first()?.as_object()?;
    Some(Value::Array(
        first.keys().map(|key| Value::String(key.clone())).collect(),
    ))
}

impl Component for BuiltinComponent {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn render(&self, key: &str, mut props: Map<String, Value>) -> ViewNode {
        // Tables without explicit columns show every field of the first row
        if self.kind == ComponentKind::Table && !props.contains_key("columns") {
            let columns = props
                .get("rowData")
                .and_then(Value::as_array)
                .and_then(|rows| infer_columns(rows));
            if let Some(columns) = columns {
                props.insert("columns".to_string(), columns);
            }
        }
        ViewNode::new(self.name).with_key(key).with_props(props)
    }
}

const BUILTINS: &[BuiltinComponent] = &[
    BuiltinComponent::new("StatCard", ComponentKind::Display),
    BuiltinComponent::new("DeviceCard", ComponentKind::Display),
    BuiltinComponent::new("GaugeCard", ComponentKind::Display),
    BuiltinComponent::new("SparklineCard", ComponentKind::Display),
    BuiltinComponent::new("ToggleCard", ComponentKind::Actuator),
    BuiltinComponent::new("SliderCard", ComponentKind::Actuator),
    BuiltinComponent::new("ToggleSwitch", ComponentKind::Actuator),
    BuiltinComponent::new("BarChart", ComponentKind::Chart),
    BuiltinComponent::new("LineChart", ComponentKind::Chart),
    BuiltinComponent::new("PieChart", ComponentKind::Chart),
    BuiltinComponent::new("SmartChart", ComponentKind::Chart),
    BuiltinComponent::new("DataTable", ComponentKind::Table),
    BuiltinComponent::new("SmartTable", ComponentKind::Table),
    BuiltinComponent::new("Card", ComponentKind::Layout),
    BuiltinComponent::new("Alert", ComponentKind::Feedback),
    BuiltinComponent::new("EmptyState", ComponentKind::Feedback),
    BuiltinComponent::new("Button", ComponentKind::Layout),
];

/// Manifest shorthands that do not normalize to a built-in name
const ALIASES: &[(&str, &str)] = &[
    ("stat_card", "StatCard"),
    ("chart_line", "LineChart"),
    ("chart_bar", "BarChart"),
    ("chart_pie", "PieChart"),
    ("smart_table", "SmartTable"),
    ("smart_chart", "SmartChart"),
    ("button", "Button"),
];

/// Register all built-in components and aliases
pub fn register_all(registry: &mut ComponentRegistry) {
    for builtin in BUILTINS {
        registry.register(Arc::new(*builtin));
    }
    for (alias, target) in ALIASES {
        registry.alias(alias, target);
    }
    log::debug!("Registered {} built-in components", BUILTINS.len());
}

/// A registry pre-populated with the built-ins
pub fn builtin_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    register_all(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramme_core::PLACEHOLDER_COMPONENT;
    use serde_json::json;

    #[test]
    fn test_all_builtins_and_aliases_resolve() {
        let registry = builtin_registry();
        for builtin in BUILTINS {
            assert_eq!(registry.resolve(builtin.name).name(), builtin.name);
        }
        for (alias, target) in ALIASES {
            assert_eq!(registry.resolve(alias).name(), *target);
        }
    }

    #[test]
    fn test_normalized_lookup() {
        let registry = builtin_registry();
        assert_eq!(registry.resolve("statcard").name(), "StatCard");
        assert_eq!(registry.resolve("toggle-card").name(), "ToggleCard");
        assert_eq!(registry.resolve("DATA_TABLE").name(), "DataTable");
        assert!(registry.resolve("toggle_switch").kind().is_actuator());
        assert_eq!(registry.resolve("FluxCapacitor").name(), PLACEHOLDER_COMPONENT);
    }

    #[test]
    fn test_table_infers_columns() {
        let table = BuiltinComponent::new("DataTable", ComponentKind::Table);
        let mut props = Map::new();
        props.insert("rowData".to_string(), json!([{"id": 1, "make": "Volvo"}]));
        let node = table.render("t", props);
        assert_eq!(node.props["columns"], json!(["id", "make"]));

        let mut props = Map::new();
        props.insert("rowData".to_string(), json!([{"id": 1}]));
        props.insert("columns".to_string(), json!(["id"]));
        assert_eq!(table.render("t", props).props["columns"], json!(["id"]));

        let chart = BuiltinComponent::new("LineChart", ComponentKind::Chart);
        let mut props = Map::new();
        props.insert("rowData".to_string(), json!([{"x": 1}]));
        assert!(chart.render("c", props).props.get("columns").is_none());
    }
}
