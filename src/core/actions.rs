//! Outbound actions: routing a user command to the transport of its signal

use anyhow::Result;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use ramme_types::{AppManifest, SignalSourceKind};

/// A command ready to be handed to a transport client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum Outbound {
    Mqtt { topic: String, payload: String },
    /// POSTed as JSON `{id, value}`
    Http { endpoint: String, body: Value },
}

/// Transport seam for outbound commands.
///
/// The engine never opens sockets itself; the embedding application
/// provides a sink wired to its MQTT/HTTP clients.
pub trait OutboundSink: Send + Sync {
    fn send(&self, outbound: &Outbound) -> Result<()>;

    /// Whether the MQTT link is up; publishes are skipped while it is down
    fn is_connected(&self) -> bool {
        true
    }
}

/// Sink that only logs what would have been sent
#[derive(Debug, Default)]
pub struct LogSink;

impl OutboundSink for LogSink {
    fn send(&self, outbound: &Outbound) -> Result<()> {
        match outbound {
            Outbound::Mqtt { topic, payload } => info!("[MQTT] Publishing to '{}': {}", topic, payload),
            Outbound::Http { endpoint, body } => info!("[HTTP] POST to {}: {}", endpoint, body),
        }
        Ok(())
    }
}

/// What happened to a dispatched action
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    UnknownEntity,
    /// The entity lists no signal, or its first signal is not declared
    NoSignal,
    /// Mock mode: logged, nothing sent
    Mocked { signal_id: String, value: Value },
    Sent(Outbound),
    /// Signal has no usable transport (mock source, missing topic/endpoint, link down)
    NotSent,
    Failed(String),
}

/// Routes actuator commands to the primary signal of an entity
pub struct ActionDispatcher {
    manifest: Arc<AppManifest>,
    sink: Arc<dyn OutboundSink>,
}

/// MQTT payload text: objects and arrays as JSON, strings verbatim
fn mqtt_payload(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ActionDispatcher {
    pub fn new(manifest: Arc<AppManifest>, sink: Arc<dyn OutboundSink>) -> Self {
        Self { manifest, sink }
    }

    /// Send `value` to the entity's first signal.
    ///
    /// The signal store is not touched; the new value comes back through
    /// the transport like any other reading.
    pub fn send_action(&self, entity_id: &str, value: Value) -> DispatchOutcome {
        let Some(entity) = self.manifest.entity(entity_id) else {
            warn!("[Action] Entity not found: {}", entity_id);
            return DispatchOutcome::UnknownEntity;
        };
        let Some(signal) = entity
            .signals
            .first()
            .and_then(|id| self.manifest.signal(id))
        else {
            warn!("[Action] No signal linked to entity: {}", entity_id);
            return DispatchOutcome::NoSignal;
        };

        if self.manifest.config.mock_mode {
            info!("[Mock Action] Setting {} to: {}", entity.name, value);
            return DispatchOutcome::Mocked {
                signal_id: signal.id.clone(),
                value,
            };
        }

        let outbound = match (&signal.source, &signal.topic, &signal.endpoint) {
            (SignalSourceKind::Mqtt, Some(topic), _) => {
                if !self.sink.is_connected() {
                    warn!("[Action] Cannot send: MQTT disconnected");
                    return DispatchOutcome::NotSent;
                }
                Outbound::Mqtt {
                    topic: topic.clone(),
                    payload: mqtt_payload(&value),
                }
            }
            (SignalSourceKind::Http, _, Some(endpoint)) => Outbound::Http {
                endpoint: endpoint.clone(),
                body: json!({"id": signal.id, "value": value}),
            },
            _ => {
                warn!("[Action] Signal '{}' has no outbound transport", signal.id);
                return DispatchOutcome::NotSent;
            }
        };

        match self.sink.send(&outbound) {
            Ok(()) => DispatchOutcome::Sent(outbound),
            Err(e) => {
                error!("[Action] Failed to send to '{}': {:#}", signal.id, e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that keeps everything it is given
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub sent: Mutex<Vec<Outbound>>,
        pub disconnected: bool,
    }

    impl OutboundSink for RecordingSink {
        fn send(&self, outbound: &Outbound) -> Result<()> {
            self.sent.lock().unwrap().push(outbound.clone());
            Ok(())
        }

        fn is_connected(&self) -> bool {
            !self.disconnected
        }
    }

    fn manifest(mock_mode: bool) -> Arc<AppManifest> {
        let mut manifest = AppManifest::from_json(
            r#"{
                "domain": {
                    "signals": [
                        {"id": "pump_state", "source": "mqtt", "topic": "plant/pump/set"},
                        {"id": "fan_speed", "source": "http", "endpoint": "/api/fan"},
                        {"id": "sim", "source": "mock"}
                    ],
                    "entities": [
                        {"id": "pump", "name": "Pump", "signals": ["pump_state"]},
                        {"id": "fan", "name": "Fan", "signals": ["fan_speed"]},
                        {"id": "sim_dev", "name": "Sim", "signals": ["sim"]},
                        {"id": "empty", "name": "Empty", "signals": []}
                    ]
                }
            }"#,
        )
        .unwrap();
        manifest.config.mock_mode = mock_mode;
        Arc::new(manifest)
    }

    #[test]
    fn test_mqtt_routing() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = ActionDispatcher::new(manifest(false), sink.clone());
        let outcome = dispatcher.send_action("pump", json!(true));

        let expected = Outbound::Mqtt {
            topic: "plant/pump/set".to_string(),
            payload: "true".to_string(),
        };
        assert_eq!(outcome, DispatchOutcome::Sent(expected.clone()));
        assert_eq!(*sink.sent.lock().unwrap(), vec![expected]);
    }

    #[test]
    fn test_http_routing_body() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = ActionDispatcher::new(manifest(false), sink.clone());
        dispatcher.send_action("fan", json!(75));

        assert_eq!(
            *sink.sent.lock().unwrap(),
            vec![Outbound::Http {
                endpoint: "/api/fan".to_string(),
                body: json!({"id": "fan_speed", "value": 75}),
            }]
        );
    }

    #[test]
    fn test_mock_mode_sends_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = ActionDispatcher::new(manifest(true), sink.clone());
        assert_eq!(
            dispatcher.send_action("pump", json!(false)),
            DispatchOutcome::Mocked {
                signal_id: "pump_state".to_string(),
                value: json!(false)
            }
        );
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unroutable_actions() {
        let sink = Arc::new(RecordingSink {
            disconnected: true,
            ..Default::default()
        });
        let dispatcher = ActionDispatcher::new(manifest(false), sink.clone());
        assert_eq!(dispatcher.send_action("nope", json!(1)), DispatchOutcome::UnknownEntity);
        assert_eq!(dispatcher.send_action("empty", json!(1)), DispatchOutcome::NoSignal);
        assert_eq!(dispatcher.send_action("sim_dev", json!(1)), DispatchOutcome::NotSent);
        assert_eq!(dispatcher.send_action("pump", json!(1)), DispatchOutcome::NotSent);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mqtt_payload_text() {
        assert_eq!(mqtt_payload(&json!("on")), "on");
        assert_eq!(mqtt_payload(&json!(21.5)), "21.5");
        assert_eq!(mqtt_payload(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
