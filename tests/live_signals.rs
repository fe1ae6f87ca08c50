//! Signal store, simulation, workflows and persistence working together

use ramme_core::{ManualClock, MemoryStorage, Storage};
use ramme_dash::core::{
    check_condition, DashboardRuntime, EffectSink, FileStorage, Severity, AGENT_THINKING,
};
use ramme_dash::{AppManifest, Settings};
use ramme_types::{map_status, FireMode, RecordId, SignalStatus, UiStatus};
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEMO: &str = include_str!("../manifests/demo.json");

#[derive(Default)]
struct Effects {
    messages: Mutex<Vec<String>>,
}

impl EffectSink for Effects {
    fn notify(&self, message: &str, _severity: Severity) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn navigate(&self, path: &str) {
        self.messages.lock().unwrap().push(format!("navigate {}", path));
    }
}

fn manifest() -> Arc<AppManifest> {
    Arc::new(AppManifest::from_json(DEMO).unwrap())
}

#[test]
fn test_simulated_values_stay_clamped() {
    let settings = Settings {
        simulation_variance: 5.0,
        ..Settings::default()
    };
    let clock = Arc::new(ManualClock::new(0));
    let runtime = DashboardRuntime::builder(manifest(), settings)
        .clock(clock.clone())
        .simulation_seed(42)
        .build();

    runtime.store().update("cpu_load", json!(94.8));
    for _ in 0..500 {
        runtime.tick();
        clock.advance(Duration::from_millis(2_000));
        let cpu = runtime.store().get("cpu_load").unwrap().value.as_f64().unwrap();
        assert!((0.0..=95.0).contains(&cpu), "cpu_load escaped bounds: {}", cpu);
        let boiler = runtime.store().get("boiler_temp").unwrap().value.as_f64().unwrap();
        assert!((20.0..=95.0).contains(&boiler), "boiler_temp escaped bounds: {}", boiler);
    }
    // Non-numeric signals are never written by the simulator
    assert!(runtime.store().get("pump_state").is_none());
}

#[test]
fn test_staleness_follows_the_clock() {
    let clock = Arc::new(ManualClock::new(5_000));
    let runtime = DashboardRuntime::builder(manifest(), Settings::default())
        .clock(clock.clone())
        .simulate(false)
        .build();

    assert_eq!(
        runtime.resolve_signal("boiler_temp").status,
        SignalStatus::Disconnected
    );
    runtime.store().update("boiler_temp", json!(70));
    assert_eq!(runtime.resolve_signal("boiler_temp").ui_status, UiStatus::Online);

    clock.advance(Duration::from_millis(10_001));
    let stale = runtime.resolve_signal("boiler_temp");
    assert_eq!(stale.status, SignalStatus::Stale);
    assert_eq!(stale.ui_status, UiStatus::Warning);
}

#[test]
fn test_status_mapping_is_total() {
    assert_eq!(map_status("fresh"), UiStatus::Online);
    assert_eq!(map_status("stale"), UiStatus::Warning);
    assert_eq!(map_status("disconnected"), UiStatus::Offline);
    assert_eq!(map_status("error"), UiStatus::Error);
    for other in ["", "FRESH", "unknown", "💥"] {
        assert_eq!(map_status(other), UiStatus::Offline);
    }
}

#[test]
fn test_http_failure_keeps_last_value() {
    let runtime = DashboardRuntime::builder(manifest(), Settings::default())
        .clock(Arc::new(ManualClock::new(0)))
        .simulate(false)
        .build();

    runtime.ingest_http("/api_mock.json", &json!({"finance": {"mrr": 900}}));
    runtime.ingest_http("/api_mock.json", &json!({"finance": {}}));

    let mrr = runtime.resolve_signal("mrr_stripe");
    assert_eq!(mrr.value, json!(900));
    assert_eq!(mrr.ui_status, UiStatus::Error);
}

#[test]
fn test_overheat_workflow_fires_once_per_crossing() {
    let effects = Arc::new(Effects::default());
    let runtime = DashboardRuntime::builder(manifest(), Settings::default())
        .clock(Arc::new(ManualClock::new(0)))
        .effects(effects.clone())
        .simulate(false)
        .build();

    runtime.store().update("boiler_temp", json!(85));
    assert!(effects.messages.lock().unwrap().is_empty());

    runtime.store().update("boiler_temp", json!(91));
    runtime.store().update("boiler_temp", json!(93));
    assert_eq!(
        *effects.messages.lock().unwrap(),
        vec![
            "Boiler above 90°C".to_string(),
            AGENT_THINKING.to_string(),
            "Agent: \"System Operating Normally.\"".to_string(),
        ]
    );

    runtime.store().update("boiler_temp", json!(70));
    runtime.store().update("boiler_temp", json!(91));
    assert_eq!(effects.messages.lock().unwrap().len(), 6);

    // Inactive workflows never fire on their own but can be triggered by hand
    runtime.store().update("cpu_load", json!(1));
    assert_eq!(effects.messages.lock().unwrap().len(), 6);
    assert!(runtime.trigger_workflow("cpu_idle"));
    assert_eq!(
        effects.messages.lock().unwrap().last().map(String::as_str),
        Some("navigate /diagnostics")
    );
}

#[test]
fn test_continuous_mode_refires() {
    let effects = Arc::new(Effects::default());
    let settings = Settings {
        workflow_fire_mode: FireMode::Continuous,
        ..Settings::default()
    };
    let runtime = DashboardRuntime::builder(manifest(), settings)
        .clock(Arc::new(ManualClock::new(0)))
        .effects(effects.clone())
        .simulate(false)
        .build();

    runtime.store().update("boiler_temp", json!(91));
    runtime.store().update("boiler_temp", json!(92));
    assert_eq!(effects.messages.lock().unwrap().len(), 6);
}

#[test]
fn test_malformed_conditions_are_false() {
    for condition in ["", ">", "> eighty", "~ 80", "80 >", "> 80 extra"] {
        assert!(!check_condition(&json!(100), condition), "{:?}", condition);
    }
    assert!(check_condition(&json!(100), "> 80"));
}

#[test]
fn test_seeding_happens_once_per_storage() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let runtime = DashboardRuntime::builder(manifest(), Settings::default())
        .storage(storage.clone())
        .simulate(false)
        .build();

    let mut cars = runtime.open_collection("demo_cars");
    let mut last = 5;
    for _ in 0..10 {
        let id = cars.create(Map::new()).id.as_number();
        assert!(id > last);
        last = id;
    }
    assert!(cars.delete(&RecordId::Number(3)));

    let again = DashboardRuntime::builder(manifest(), Settings::default())
        .storage(storage)
        .simulate(false)
        .build();
    let rows = again.resolve_data("demo_cars").unwrap();
    assert_eq!(rows.len(), 14);
    assert!(rows.iter().all(|row| row["id"] != json!(3)));
}

#[test]
fn test_file_backed_lake_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let runtime = DashboardRuntime::builder(manifest(), Settings::default())
            .storage(Arc::new(FileStorage::open(dir.path()).unwrap()))
            .simulate(false)
            .build();
        assert_eq!(runtime.data().initialize(), 3);
        let mut cars = runtime.open_collection("demo_cars");
        let mut fields = Map::new();
        fields.insert("make".to_string(), json!("Rivian"));
        cars.create(fields);
    }

    let runtime = DashboardRuntime::builder(manifest(), Settings::default())
        .storage(Arc::new(FileStorage::open(dir.path()).unwrap()))
        .simulate(false)
        .build();
    assert_eq!(runtime.data().initialize(), 0);
    let cars = runtime.resolve_data("demo_cars").unwrap();
    assert_eq!(cars.last().unwrap()["make"], json!("Rivian"));

    runtime.data().reset();
    assert!(runtime.data().persisted_collections().is_empty());
    assert_eq!(runtime.resolve_data("demo_cars").unwrap().len(), 5);
}
