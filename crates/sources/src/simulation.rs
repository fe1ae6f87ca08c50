//! Simulated signal source for mock mode and demonstrations
//!
//! Every numeric signal drifts by a bounded random delta per tick and is
//! clamped to its declared `[min, max]`. Non-numeric signals are left alone.

use std::sync::Arc;
use std::time::Duration;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use ramme_core::{
    SignalSource, SignalStore, SourceMetadata, DEFAULT_SIMULATION_INTERVAL,
    DEFAULT_SIMULATION_VARIANCE,
};
use ramme_types::{AppManifest, SignalDefinition};

/// Configuration for the simulator
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Maximum absolute change per tick
    pub variance: f64,
    pub interval: Duration,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            variance: DEFAULT_SIMULATION_VARIANCE,
            interval: DEFAULT_SIMULATION_INTERVAL,
            seed: None,
        }
    }
}

/// Random-walk signal source
pub struct Simulator {
    metadata: SourceMetadata,
    manifest: Arc<AppManifest>,
    variance: f64,
    rng: StdRng,
}

impl Simulator {
    pub fn new(manifest: Arc<AppManifest>, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            metadata: SourceMetadata {
                id: "simulation".to_string(),
                name: "Simulation".to_string(),
                default_interval: config.interval,
            },
            manifest,
            variance: config.variance.abs(),
            rng,
        }
    }

    /// Advance every numeric signal by one step
    pub fn tick(&mut self, store: &SignalStore) -> usize {
        let mut updated = 0;
        for def in &self.manifest.domain.signals {
            let current = store
                .get(&def.id)
                .map(|v| v.value)
                .or_else(|| def.default_value.clone());

            let Some(current) = current.as_ref().and_then(Value::as_f64) else {
                continue;
            };

            let delta = if self.variance > 0.0 {
                self.rng.gen_range(-self.variance..=self.variance)
            } else {
                0.0
            };
            let next = step(def, current, delta);
            store.update(&def.id, number(next));
            updated += 1;
        }
        trace!("Simulation tick updated {} signals", updated);
        updated
    }
}

/// One bounded random-walk step, rounded to one decimal, then clamped
pub fn step(def: &SignalDefinition, current: f64, delta: f64) -> f64 {
    let rounded = ((current + delta) * 10.0).round() / 10.0;
    def.clamp(rounded)
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl SignalSource for Simulator {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn poll(&mut self, store: &SignalStore) -> anyhow::Result<()> {
        self.tick(store);
        Ok(())
    }
}
