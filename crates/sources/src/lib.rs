//! ramme-sources: Signal source implementations for Ramme dashboards.

mod http;
mod mqtt;
mod simulation;

pub use http::{dotted_path, HttpIngest, DEFAULT_HTTP_POLL_INTERVAL};
pub use mqtt::{coerce_payload, MqttRouter};
pub use simulation::{step, SimulationConfig, Simulator};
