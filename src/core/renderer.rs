//! Manifest renderer - turns a page definition into a view tree.
//!
//! Every block is resolved through the component registry and fed with its
//! static props, its data collection and its live signal. Rendering never
//! fails as a whole: unknown component types become placeholders, unknown
//! collections render as empty, unknown signals render without a value.
//!
//! A page is rendered against a single signal snapshot and a single `now`,
//! so the same store contents always produce the same tree.

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use ramme_core::{ComponentRegistry, SignalSnapshot, ViewNode};
use ramme_types::{AppManifest, Block, PageDefinition, PageSection, DATA_ID_PROP, SIGNAL_ID_PROP};

use super::data_registry::DataRegistry;
use super::resolver::{is_truthy, SignalResolver};

/// Prop naming the entity an actuator controls, when it is not inferred from the signal
pub const ENTITY_ID_PROP: &str = "entityId";

/// Result of rendering a page id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageView {
    Found(RenderedPage),
    NotFound { page_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub columns: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub blocks: Vec<RenderedBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBlock {
    pub key: String,
    pub col_span: u32,
    pub row_span: u32,
    pub node: ViewNode,
    /// Present on actuators: where a user toggle should be dispatched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionBinding>,
}

/// Target of an actuator's user input, for `ActionDispatcher::send_action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBinding {
    pub entity_id: String,
    pub signal_id: String,
}

pub struct Renderer {
    manifest: Arc<AppManifest>,
    registry: Arc<ComponentRegistry>,
    data: Arc<DataRegistry>,
    resolver: Arc<SignalResolver>,
    default_columns: u32,
}

/// Value as handed to display components: numbers stay numeric, the rest is text
fn display_value(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Null => value.clone(),
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

impl Renderer {
    pub fn new(
        manifest: Arc<AppManifest>,
        registry: Arc<ComponentRegistry>,
        data: Arc<DataRegistry>,
        resolver: Arc<SignalResolver>,
        default_columns: u32,
    ) -> Self {
        Self {
            manifest,
            registry,
            data,
            resolver,
            default_columns: default_columns.max(1),
        }
    }

    pub fn manifest(&self) -> &Arc<AppManifest> {
        &self.manifest
    }

    /// Render a page against the current signal store contents
    pub fn render_page(&self, page_id: &str, snapshot: &SignalSnapshot, now_ms: u64) -> PageView {
        let Some(page) = self.manifest.page(page_id) else {
            warn!("[Renderer] Page not found: {}", page_id);
            return PageView::NotFound {
                page_id: page_id.to_string(),
            };
        };
        debug!("Rendering page '{}' ({} sections)", page.id, page.sections.len());
        PageView::Found(self.render_definition(page, snapshot, now_ms))
    }

    fn render_definition(
        &self,
        page: &PageDefinition,
        snapshot: &SignalSnapshot,
        now_ms: u64,
    ) -> RenderedPage {
        RenderedPage {
            id: page.id.clone(),
            slug: page.slug.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            icon: page.icon.clone(),
            sections: page
                .sections
                .iter()
                .map(|section| self.render_section(section, snapshot, now_ms))
                .collect(),
        }
    }

    fn render_section(
        &self,
        section: &PageSection,
        snapshot: &SignalSnapshot,
        now_ms: u64,
    ) -> RenderedSection {
        let columns = match section.layout.columns {
            Some(columns) if columns > 0 => columns,
            _ => self.default_columns,
        };
        RenderedSection {
            id: section.id.clone(),
            title: section.title.clone(),
            columns,
            variant: section.layout.variant.clone(),
            blocks: section
                .blocks
                .iter()
                .map(|block| self.render_block(block, snapshot, now_ms))
                .collect(),
        }
    }

    /// Render a single block
    pub fn render_block(&self, block: &Block, snapshot: &SignalSnapshot, now_ms: u64) -> RenderedBlock {
        let component = self.registry.resolve(&block.component_type);
        let signal_id = block.signal_ref().map(str::to_string);
        let data_id = block.data_ref().map(str::to_string);

        let mut props: Map<String, Value> = block
            .props
            .iter()
            .filter(|(key, _)| key.as_str() != SIGNAL_ID_PROP && key.as_str() != DATA_ID_PROP)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(data_id) = &data_id {
            props.insert(DATA_ID_PROP.to_string(), Value::from(data_id.as_str()));
        }
        if let Some(signal_id) = &signal_id {
            props.insert(SIGNAL_ID_PROP.to_string(), Value::from(signal_id.as_str()));
        }

        if let Some(data_id) = &data_id {
            let rows = self.data.resolve_data(data_id).unwrap_or_else(|| {
                warn!("[Renderer] Block '{}': unknown data id '{}'", block.id, data_id);
                Vec::new()
            });
            let rows = Value::Array(rows);
            props.insert("data".to_string(), rows.clone());
            props.insert("rowData".to_string(), rows);
        }

        let mut action = None;
        if let Some(signal_id) = &signal_id {
            if self.manifest.signal(signal_id).is_none() && !snapshot.contains_key(signal_id) {
                warn!("[Renderer] Block '{}': unknown signal '{}'", block.id, signal_id);
            }
            let resolved = self.resolver.resolve_in(snapshot, signal_id, now_ms);
            props.insert("value".to_string(), display_value(&resolved.value));
            props.insert("status".to_string(), Value::from(resolved.ui_status.as_str()));
            if let Some(unit) = &resolved.unit {
                props.entry("unit".to_string()).or_insert_with(|| Value::from(unit.as_str()));
            }
            if component.kind().is_actuator() {
                props.insert("checked".to_string(), Value::Bool(is_truthy(&resolved.value)));
                action = self.action_binding(block, signal_id);
            }
        }

        RenderedBlock {
            key: block.id.clone(),
            col_span: block.col_span(),
            row_span: block.row_span(),
            node: component.render(&block.id, props),
            action,
        }
    }

    fn action_binding(&self, block: &Block, signal_id: &str) -> Option<ActionBinding> {
        let explicit = block.props.get(ENTITY_ID_PROP).and_then(Value::as_str);
        let entity_id = match explicit {
            Some(id) => id.to_string(),
            None => match self.manifest.entity_for_signal(signal_id) {
                Some(entity) => entity.id.clone(),
                None => {
                    warn!(
                        "[Renderer] Actuator '{}' has no entity for signal '{}'",
                        block.id, signal_id
                    );
                    return None;
                }
            },
        };
        Some(ActionBinding {
            entity_id,
            signal_id: signal_id.to_string(),
        })
    }
}
