//! Registry mapping block type names to components

use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::{BoxedComponent, PlaceholderComponent};

/// Registry of components addressable from a manifest.
///
/// Built-ins are registered once at startup; embedding applications can add
/// their own components (or aliases) before the registry is shared.
pub struct ComponentRegistry {
    components: HashMap<String, BoxedComponent>,
    /// Lowercased name → registered key
    folded: HashMap<String, String>,
    /// Lowercased name with separators removed → registered key
    compact: HashMap<String, String>,
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn compact(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            folded: HashMap::new(),
            compact: HashMap::new(),
        }
    }

    /// Register a component under its own name
    pub fn register(&mut self, component: BoxedComponent) {
        let name = component.name().to_string();
        self.register_as(&name, component);
    }

    /// Register a component under an explicit key (used for aliases)
    pub fn register_as(&mut self, key: &str, component: BoxedComponent) {
        self.components.insert(key.to_string(), component);
        // First registration wins for the normalized forms
        self.folded
            .entry(fold(key))
            .or_insert_with(|| key.to_string());
        self.compact
            .entry(compact(key))
            .or_insert_with(|| key.to_string());
    }

    /// Point `alias` at an already registered component; returns false if the target is unknown
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        match self.components.get(target).cloned() {
            Some(component) => {
                self.register_as(alias, component);
                true
            }
            None => {
                warn!("[Registry] Cannot alias '{}' to unknown component '{}'", alias, target);
                false
            }
        }
    }

    /// Look a name up without falling back.
    ///
    /// Tries the exact key, then a case-insensitive match, then a match with
    /// separators (`_`, `-`) stripped.
    pub fn lookup(&self, name: &str) -> Option<BoxedComponent> {
        if let Some(component) = self.components.get(name) {
            return Some(Arc::clone(component));
        }
        self.folded
            .get(&fold(name))
            .or_else(|| self.compact.get(&compact(name)))
            .and_then(|key| self.components.get(key))
            .cloned()
    }

    /// Resolve a name, falling back to a placeholder that names the miss
    pub fn resolve(&self, name: &str) -> BoxedComponent {
        match self.lookup(name) {
            Some(component) => component,
            None => {
                warn!("[Registry] Unknown component type: \"{}\"", name);
                Arc::new(PlaceholderComponent::new(name))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// List all registered keys (aliases included), sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
