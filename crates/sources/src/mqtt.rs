//! MQTT signal ingest: topic routing and payload coercion

use std::collections::BTreeMap;

use log::{debug, trace};
use serde_json::Value;

use ramme_core::SignalStore;
use ramme_types::{AppManifest, SignalSourceKind};

/// Coerce a UTF-8 payload into a JSON value: bool, then number, then string
pub fn coerce_payload(payload: &str) -> Value {
    let trimmed = payload.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(payload.to_string())
}

/// Topic → signal routing table built from the manifest
#[derive(Debug, Clone, Default)]
pub struct MqttRouter {
    routes: BTreeMap<String, Vec<String>>,
}

impl MqttRouter {
    pub fn from_manifest(manifest: &AppManifest) -> Self {
        let mut routes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for def in &manifest.domain.signals {
            if def.source != SignalSourceKind::Mqtt {
                continue;
            }
            match &def.topic {
                Some(topic) => routes.entry(topic.clone()).or_default().push(def.id.clone()),
                None => log::warn!("MQTT signal '{}' has no topic, skipping", def.id),
            }
        }
        Self { routes }
    }

    /// Topics to subscribe to, in sorted order
    pub fn topics(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Signal ids bound to a topic
    pub fn signals_for(&self, topic: &str) -> &[String] {
        self.routes.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply one incoming message. Returns false when nothing listens on `topic`.
    pub fn ingest(&self, store: &SignalStore, topic: &str, payload: &[u8]) -> bool {
        let Some(signal_ids) = self.routes.get(topic) else {
            debug!("[MQTT] Ignoring message on unrouted topic '{}'", topic);
            return false;
        };
        let text = String::from_utf8_lossy(payload);
        let value = coerce_payload(&text);
        trace!("[MQTT] {} -> {}", topic, value);
        for id in signal_ids {
            store.update(id, value.clone());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramme_core::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_coerce_payload() {
        assert_eq!(coerce_payload("true"), json!(true));
        assert_eq!(coerce_payload(" false "), json!(false));
        assert_eq!(coerce_payload("42"), json!(42));
        assert_eq!(coerce_payload("-3.5"), json!(-3.5));
        assert_eq!(coerce_payload("TRUE"), json!("TRUE"));
        assert_eq!(coerce_payload("on"), json!("on"));
        assert_eq!(coerce_payload("NaN"), json!("NaN"));
        assert_eq!(coerce_payload(""), json!(""));
    }

    #[test]
    fn test_router_ingest() {
        let manifest: AppManifest = serde_json::from_value(json!({
            "domain": {"signals": [
                {"id": "living_temp", "source": "mqtt", "topic": "home/living/temp"},
                {"id": "living_temp_copy", "source": "mqtt", "topic": "home/living/temp"},
                {"id": "no_topic", "source": "mqtt"}
            ]}
        }))
        .unwrap();
        let router = MqttRouter::from_manifest(&manifest);
        let store = SignalStore::new(Arc::new(ManualClock::new(0)));

        assert_eq!(router.topics(), vec!["home/living/temp"]);
        assert!(router.ingest(&store, "home/living/temp", b"21.5"));
        assert_eq!(store.get("living_temp").unwrap().value, json!(21.5));
        assert_eq!(store.get("living_temp_copy").unwrap().value, json!(21.5));
        assert!(!router.ingest(&store, "home/kitchen/temp", b"19"));
        assert!(router.signals_for("nope").is_empty());
    }
}
