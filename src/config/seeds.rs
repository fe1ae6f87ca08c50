//! Built-in seed collections for the data lake
//!
//! These are written into storage the first time a collection is accessed,
//! so a fresh install renders tables and charts immediately.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Seed rows keyed by collection id
pub type SeedSet = BTreeMap<String, Vec<Value>>;

static DEFAULT_SEEDS: Lazy<SeedSet> = Lazy::new(|| {
    let mut seeds = SeedSet::new();
    seeds.insert(
        "energy_history".to_string(),
        vec![
            json!({"time": "12am", "value": 12}),
            json!({"time": "4am", "value": 19}),
            json!({"time": "8am", "value": 3}),
            json!({"time": "12pm", "value": 5}),
            json!({"time": "4pm", "value": 2}),
            json!({"time": "8pm", "value": 3}),
        ],
    );
    seeds.insert(
        "demo_chart".to_string(),
        vec![
            json!({"name": "Jan", "uv": 400, "pv": 240}),
            json!({"name": "Feb", "uv": 300, "pv": 139}),
            json!({"name": "Mar", "uv": 200, "pv": 980}),
            json!({"name": "Apr", "uv": 278, "pv": 390}),
            json!({"name": "May", "uv": 189, "pv": 480}),
            json!({"name": "Jun", "uv": 239, "pv": 380}),
            json!({"name": "Jul", "uv": 349, "pv": 430}),
        ],
    );
    seeds.insert(
        "demo_cars".to_string(),
        vec![
            json!({"id": 1, "make": "Tesla", "model": "Model Y", "price": 64950, "electric": true}),
            json!({"id": 2, "make": "Ford", "model": "F-Series", "price": 33850, "electric": false}),
            json!({"id": 3, "make": "Toyota", "model": "Corolla", "price": 29600, "electric": false}),
            json!({"id": 4, "make": "Mercedes", "model": "EQS", "price": 102310, "electric": true}),
            json!({"id": 5, "make": "BMW", "model": "i4", "price": 51400, "electric": true}),
        ],
    );
    seeds
});

/// The built-in seed set
pub fn default_seeds() -> SeedSet {
    DEFAULT_SEEDS.clone()
}
