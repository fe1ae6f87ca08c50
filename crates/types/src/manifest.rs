//! The application manifest - single source of truth for a dashboard.
//!
//! A manifest declares the domain (signals, entities, workflows) and the
//! page tree (pages → sections → blocks). It is loaded once and treated as
//! read-only for the lifetime of the process.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::signal::SignalDefinition;
use crate::workflow::WorkflowDefinition;

/// Root aggregate of a dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppManifest {
    #[serde(default)]
    pub meta: ManifestMeta,
    #[serde(default)]
    pub config: ManifestConfig,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for ManifestMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_version(),
            description: None,
            author: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// When set, actions are logged instead of sent over a transport
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_url: Option<String>,
}

fn default_theme() -> String {
    "system".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mock_mode: false,
            broker_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Domain {
    #[serde(default)]
    pub signals: Vec<SignalDefinition>,
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub workflows: Vec<WorkflowDefinition>,
}

/// A device or KPI grouping one or more signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub category: String,
    /// Signal ids; lookups only, the entity does not own them
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub ui: EntityUi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntityUi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDefinition {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub sections: Vec<PageSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub layout: SectionLayout,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Leaf unit of the manifest tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<BlockLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
}

/// Prop keys that carry bindings rather than static configuration
pub const SIGNAL_ID_PROP: &str = "signalId";
pub const DATA_ID_PROP: &str = "dataId";

impl Block {
    /// Bound signal id: the block field wins over a `signalId` prop
    pub fn signal_ref(&self) -> Option<&str> {
        self.signal_id
            .as_deref()
            .or_else(|| self.props.get(SIGNAL_ID_PROP).and_then(Value::as_str))
    }

    /// Bound data collection id: the block field wins over a `dataId` prop
    pub fn data_ref(&self) -> Option<&str> {
        self.data_id
            .as_deref()
            .or_else(|| self.props.get(DATA_ID_PROP).and_then(Value::as_str))
    }

    /// Column span, 1 when unset or zero
    pub fn col_span(&self) -> u32 {
        self.layout
            .and_then(|l| l.col_span)
            .filter(|span| *span > 0)
            .unwrap_or(1)
    }

    /// Row span, 1 when unset or zero
    pub fn row_span(&self) -> u32 {
        self.layout
            .and_then(|l| l.row_span)
            .filter(|span| *span > 0)
            .unwrap_or(1)
    }
}

/// A structural problem found by [`AppManifest::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestIssue {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("block '{block_id}' on page '{page_id}' references unknown signal '{signal_id}'")]
    UnknownBlockSignal {
        page_id: String,
        block_id: String,
        signal_id: String,
    },
    #[error("entity '{entity_id}' references unknown signal '{signal_id}'")]
    UnknownEntitySignal { entity_id: String, signal_id: String },
    #[error("workflow '{workflow_id}' watches unknown signal '{signal_id}'")]
    UnknownWorkflowSignal {
        workflow_id: String,
        signal_id: String,
    },
    #[error("signal '{signal_id}' has min greater than max")]
    InvertedBounds { signal_id: String },
}

impl AppManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn page(&self, page_id: &str) -> Option<&PageDefinition> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn signal(&self, signal_id: &str) -> Option<&SignalDefinition> {
        self.domain.signals.iter().find(|s| s.id == signal_id)
    }

    pub fn entity(&self, entity_id: &str) -> Option<&EntityDefinition> {
        self.domain.entities.iter().find(|e| e.id == entity_id)
    }

    /// First entity that lists `signal_id` among its signals
    pub fn entity_for_signal(&self, signal_id: &str) -> Option<&EntityDefinition> {
        self.domain
            .entities
            .iter()
            .find(|e| e.signals.iter().any(|s| s == signal_id))
    }

    /// Check the manifest for structural problems.
    ///
    /// Issues are reported, never enforced: the renderer degrades on every
    /// one of them.
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for signal in &self.domain.signals {
            if !seen.insert(signal.id.as_str()) {
                issues.push(ManifestIssue::DuplicateId {
                    kind: "signal",
                    id: signal.id.clone(),
                });
            }
            if let (Some(min), Some(max)) = (signal.min, signal.max) {
                if min > max {
                    issues.push(ManifestIssue::InvertedBounds {
                        signal_id: signal.id.clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for entity in &self.domain.entities {
            if !seen.insert(entity.id.as_str()) {
                issues.push(ManifestIssue::DuplicateId {
                    kind: "entity",
                    id: entity.id.clone(),
                });
            }
            for signal_id in &entity.signals {
                if self.signal(signal_id).is_none() {
                    issues.push(ManifestIssue::UnknownEntitySignal {
                        entity_id: entity.id.clone(),
                        signal_id: signal_id.clone(),
                    });
                }
            }
        }

        for flow in &self.domain.workflows {
            let signal_id = &flow.trigger.config.signal_id;
            if !signal_id.is_empty() && self.signal(signal_id).is_none() {
                issues.push(ManifestIssue::UnknownWorkflowSignal {
                    workflow_id: flow.id.clone(),
                    signal_id: signal_id.clone(),
                });
            }
        }

        let mut seen_pages = HashSet::new();
        for page in &self.pages {
            if !seen_pages.insert(page.id.as_str()) {
                issues.push(ManifestIssue::DuplicateId {
                    kind: "page",
                    id: page.id.clone(),
                });
            }
            let mut seen_blocks = HashSet::new();
            for block in page.sections.iter().flat_map(|s| s.blocks.iter()) {
                if !seen_blocks.insert(block.id.as_str()) {
                    issues.push(ManifestIssue::DuplicateId {
                        kind: "block",
                        id: block.id.clone(),
                    });
                }
                if let Some(signal_id) = block.signal_ref() {
                    if self.signal(signal_id).is_none() {
                        issues.push(ManifestIssue::UnknownBlockSignal {
                            page_id: page.id.clone(),
                            block_id: block.id.clone(),
                            signal_id: signal_id.to_string(),
                        });
                    }
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AppManifest {
        serde_json::from_value(json!({
            "meta": {"name": "Plant"},
            "config": {"theme": "dark", "mockMode": true},
            "domain": {
                "signals": [{"id": "temp", "label": "Temp", "min": 0, "max": 100}],
                "entities": [{"id": "boiler", "name": "Boiler", "type": "device", "signals": ["temp", "ghost"]}],
                "workflows": [{
                    "id": "hot", "active": true,
                    "trigger": {"type": "signal_change", "config": {"signalId": "pressure", "condition": "> 1"}}
                }]
            },
            "pages": [{
                "id": "home", "slug": "/", "title": "Home",
                "sections": [{
                    "id": "s1", "layout": {"columns": 3},
                    "blocks": [
                        {"id": "b1", "type": "StatCard", "signalId": "temp"},
                        {"id": "b2", "type": "StatCard", "props": {"signalId": "missing"}},
                        {"id": "b2", "type": "DataTable", "dataId": "demo_cars", "layout": {"colSpan": 2}}
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest = AppManifest::from_json("{}").unwrap();
        assert_eq!(manifest.meta.version, "1.0.0");
        assert_eq!(manifest.config.theme, "system");
        assert!(!manifest.config.mock_mode);
        assert!(manifest.pages.is_empty());
    }

    #[test]
    fn test_block_bindings_and_spans() {
        let manifest = sample();
        let blocks = &manifest.pages[0].sections[0].blocks;
        assert_eq!(blocks[0].signal_ref(), Some("temp"));
        assert_eq!(blocks[1].signal_ref(), Some("missing"));
        assert_eq!(blocks[2].data_ref(), Some("demo_cars"));
        assert_eq!(blocks[2].col_span(), 2);
        assert_eq!(blocks[2].row_span(), 1);
        assert_eq!(blocks[0].col_span(), 1);
    }

    #[test]
    fn test_validate_reports_dangling_references() {
        let issues = sample().validate();
        assert!(issues.contains(&ManifestIssue::UnknownEntitySignal {
            entity_id: "boiler".to_string(),
            signal_id: "ghost".to_string(),
        }));
        assert!(issues.contains(&ManifestIssue::UnknownWorkflowSignal {
            workflow_id: "hot".to_string(),
            signal_id: "pressure".to_string(),
        }));
        assert!(issues.contains(&ManifestIssue::UnknownBlockSignal {
            page_id: "home".to_string(),
            block_id: "b2".to_string(),
            signal_id: "missing".to_string(),
        }));
        assert!(issues.contains(&ManifestIssue::DuplicateId {
            kind: "block",
            id: "b2".to_string(),
        }));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_entity_for_signal() {
        let manifest = sample();
        assert_eq!(manifest.entity_for_signal("temp").map(|e| e.id.as_str()), Some("boiler"));
        assert!(manifest.entity_for_signal("nope").is_none());
    }
}
