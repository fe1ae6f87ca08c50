use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ramme_core::{ManualClock, MemoryStorage};
use ramme_dash::{AppManifest, DashboardRuntime, Settings};
use serde_json::json;

const DEMO: &str = include_str!("../manifests/demo.json");

fn runtime() -> DashboardRuntime {
    let manifest = Arc::new(AppManifest::from_json(DEMO).expect("demo manifest"));
    let runtime = DashboardRuntime::builder(manifest, Settings::default())
        .storage(Arc::new(MemoryStorage::new()))
        .clock(Arc::new(ManualClock::new(0)))
        .simulate(false)
        .build();
    runtime.store().update("boiler_temp", json!(71.5));
    runtime.store().update("cpu_load", json!(42));
    runtime.store().update("pump_state", json!(true));
    runtime
}

fn bench_render_page(c: &mut Criterion) {
    let runtime = runtime();
    // First access seeds the collections; measure steady state
    runtime.render_page("overview");
    runtime.render_page("fleet");

    c.bench_function("render_overview", |b| {
        b.iter(|| runtime.render_page(black_box("overview")))
    });
    c.bench_function("render_fleet", |b| {
        b.iter(|| runtime.render_page(black_box("fleet")))
    });
    c.bench_function("tick_simulation", |b| {
        let manifest = Arc::new(AppManifest::from_json(DEMO).expect("demo manifest"));
        let clock = Arc::new(ManualClock::new(0));
        let simulated = DashboardRuntime::builder(manifest, Settings::default())
            .clock(clock.clone())
            .simulation_seed(7)
            .build();
        b.iter(|| {
            clock.advance(std::time::Duration::from_secs(2));
            simulated.tick()
        })
    });
}

criterion_group!(benches, bench_render_page);
criterion_main!(benches);
