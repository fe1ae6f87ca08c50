//! HTTP signal ingest.
//!
//! The network client lives outside the engine; it hands each decoded JSON
//! response body to [`HttpIngest::ingest`], which extracts every signal bound
//! to that endpoint through its dotted path.

use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use ramme_core::SignalStore;
use ramme_types::{AppManifest, SignalSourceKind};

/// Default poll interval when a signal declares no refresh rate
pub const DEFAULT_HTTP_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Walk a dotted path (`data.finance.mrr`) into a JSON value.
///
/// Numeric segments index into arrays. An empty path returns the root.
pub fn dotted_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpBinding {
    signal_id: String,
    path: String,
}

/// Endpoint → signal bindings for every HTTP-sourced signal in a manifest
#[derive(Debug, Clone, Default)]
pub struct HttpIngest {
    endpoints: BTreeMap<String, Vec<HttpBinding>>,
    intervals: BTreeMap<String, Duration>,
}

impl HttpIngest {
    pub fn from_manifest(manifest: &AppManifest) -> Self {
        let mut ingest = Self::default();
        for def in &manifest.domain.signals {
            if def.source != SignalSourceKind::Http {
                continue;
            }
            let Some(endpoint) = def.endpoint.clone() else {
                log::warn!("HTTP signal '{}' has no endpoint, skipping", def.id);
                continue;
            };
            // Without an explicit path the signal id is looked up at the top level
            let path = def.path.clone().unwrap_or_else(|| def.id.clone());

            let interval = match def.refresh_rate {
                Some(ms) if ms > 0 => Duration::from_millis(ms),
                _ => DEFAULT_HTTP_POLL_INTERVAL,
            };
            ingest
                .intervals
                .entry(endpoint.clone())
                .and_modify(|current| *current = (*current).min(interval))
                .or_insert(interval);
            ingest.endpoints.entry(endpoint).or_default().push(HttpBinding {
                signal_id: def.id.clone(),
                path,
            });
        }
        ingest
    }

    /// Endpoints the transport should poll, in sorted order
    pub fn endpoints(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }

    /// Shortest refresh interval requested by any signal on this endpoint
    pub fn poll_interval(&self, endpoint: &str) -> Duration {
        self.intervals
            .get(endpoint)
            .copied()
            .unwrap_or(DEFAULT_HTTP_POLL_INTERVAL)
    }

    /// Apply one response body. Returns the number of signals updated.
    ///
    /// Signals whose path is missing from the body are marked as errored and
    /// keep their last value.
    pub fn ingest(&self, store: &SignalStore, endpoint: &str, body: &Value) -> usize {
        let Some(bindings) = self.endpoints.get(endpoint) else {
            debug!("No HTTP signals bound to endpoint '{}'", endpoint);
            return 0;
        };
        let mut updated = 0;
        for binding in bindings {
            match dotted_path(body, &binding.path) {
                Some(value) => {
                    store.update(&binding.signal_id, value.clone());
                    updated += 1;
                }
                None => store.mark_error(
                    &binding.signal_id,
                    format!("path '{}' missing in response from {}", binding.path, endpoint),
                ),
            }
        }
        updated
    }

    /// Record a failed request against every signal bound to `endpoint`
    pub fn fail(&self, store: &SignalStore, endpoint: &str, error: &str) {
        for binding in self.endpoints.get(endpoint).into_iter().flatten() {
            store.mark_error(&binding.signal_id, format!("{}: {}", endpoint, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramme_core::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    fn manifest() -> AppManifest {
        serde_json::from_value(json!({
            "domain": {"signals": [
                {"id": "mrr_stripe", "source": "http", "endpoint": "/api_mock.json", "path": "data.finance.mrr"},
                {"id": "active_users", "source": "http", "endpoint": "/api_mock.json", "path": "data.users.total", "refreshRate": 2000},
                {"id": "first_region", "source": "http", "endpoint": "/regions", "path": "items.0.name"},
                {"id": "temp", "source": "mock"}
            ]}
        }))
        .unwrap()
    }

    #[test]
    fn test_dotted_path() {
        let body = json!({"data": {"finance": {"mrr": 1200}}, "items": [{"name": "eu"}]});
        assert_eq!(dotted_path(&body, "data.finance.mrr"), Some(&json!(1200)));
        assert_eq!(dotted_path(&body, "items.0.name"), Some(&json!("eu")));
        assert_eq!(dotted_path(&body, "data.finance.arr"), None);
        assert_eq!(dotted_path(&body, "data.finance.mrr.deeper"), None);
        assert_eq!(dotted_path(&body, ""), Some(&body));
    }

    #[test]
    fn test_bindings_from_manifest() {
        let ingest = HttpIngest::from_manifest(&manifest());
        assert_eq!(ingest.endpoints(), vec!["/api_mock.json", "/regions"]);
        assert_eq!(ingest.poll_interval("/api_mock.json"), Duration::from_millis(2000));
        assert_eq!(ingest.poll_interval("/regions"), DEFAULT_HTTP_POLL_INTERVAL);
    }

    #[test]
    fn test_ingest_updates_and_marks_missing() {
        let store = SignalStore::new(Arc::new(ManualClock::new(0)));
        let ingest = HttpIngest::from_manifest(&manifest());
        let body = json!({"data": {"finance": {"mrr": 4200}}});

        assert_eq!(ingest.ingest(&store, "/api_mock.json", &body), 1);
        assert_eq!(store.get("mrr_stripe").unwrap().value, json!(4200));
        assert!(store.get("active_users").unwrap().error.is_some());
        assert_eq!(ingest.ingest(&store, "/unknown", &body), 0);
    }

    #[test]
    fn test_fail_marks_every_bound_signal() {
        let store = SignalStore::new(Arc::new(ManualClock::new(0)));
        let ingest = HttpIngest::from_manifest(&manifest());
        store.update("mrr_stripe", json!(10));
        ingest.fail(&store, "/api_mock.json", "timeout");

        let mrr = store.get("mrr_stripe").unwrap();
        assert_eq!(mrr.value, json!(10));
        assert!(mrr.error.unwrap().contains("timeout"));
        assert!(store.get("temp").is_none());
    }
}
