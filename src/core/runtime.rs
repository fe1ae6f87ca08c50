//! Dashboard runtime - wires manifest, stores, renderer and workflows together

use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

use ramme_core::{
    ComponentRegistry, MemoryStorage, Namespace, SharedClock, SignalStore, Storage, Subscription,
    SystemClock, UPDATE_LOOP_BASE_INTERVAL,
};
use ramme_sources::{HttpIngest, MqttRouter, SimulationConfig, Simulator};
use ramme_types::AppManifest;

use super::actions::{ActionDispatcher, DispatchOutcome, LogSink, OutboundSink};
use super::crud::CrudStore;
use super::data_registry::{DataRegistry, Rows};
use super::renderer::{PageView, Renderer};
use super::resolver::{ResolvedSignal, SignalResolver};
use super::update_manager::UpdateManager;
use super::workflow::{EffectSink, LogEffects, WorkflowEngine};
use crate::components::builtin_registry;
use crate::config::{default_seeds, SeedSet, Settings};

/// Collaborators a runtime can be built with; everything has a default
pub struct RuntimeBuilder {
    manifest: Arc<AppManifest>,
    settings: Settings,
    storage: Option<Arc<dyn Storage>>,
    clock: Option<SharedClock>,
    registry: Option<ComponentRegistry>,
    seeds: Option<SeedSet>,
    effects: Option<Arc<dyn EffectSink>>,
    sink: Option<Arc<dyn OutboundSink>>,
    simulate: Option<bool>,
    simulation_seed: Option<u64>,
}

impl RuntimeBuilder {
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn seeds(mut self, seeds: SeedSet) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn effects(mut self, effects: Arc<dyn EffectSink>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn OutboundSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Force the simulator on or off (default: on in mock mode)
    pub fn simulate(mut self, enabled: bool) -> Self {
        self.simulate = Some(enabled);
        self
    }

    pub fn simulation_seed(mut self, seed: u64) -> Self {
        self.simulation_seed = Some(seed);
        self
    }

    pub fn build(self) -> DashboardRuntime {
        let manifest = self.manifest;
        let settings = self.settings;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()) as Arc<dyn Storage>);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock) as SharedClock);

        let store = Arc::new(SignalStore::new(clock));
        let data = Arc::new(DataRegistry::new(
            storage,
            Namespace::new(settings.storage_prefix.clone()),
            self.seeds.unwrap_or_else(default_seeds),
        ));
        let resolver = Arc::new(SignalResolver::new(
            manifest.clone(),
            store.clone(),
            settings.stale_threshold_ms,
        ));
        let renderer = Renderer::new(
            manifest.clone(),
            Arc::new(self.registry.unwrap_or_else(builtin_registry)),
            data.clone(),
            resolver.clone(),
            settings.default_columns,
        );
        let workflows = Arc::new(WorkflowEngine::new(
            manifest.clone(),
            self.effects
                .unwrap_or_else(|| Arc::new(LogEffects) as Arc<dyn EffectSink>),
            settings.workflow_fire_mode,
        ));
        let workflow_subscription = workflows.attach(&store);
        let dispatcher = ActionDispatcher::new(
            manifest.clone(),
            self.sink
                .unwrap_or_else(|| Arc::new(LogSink) as Arc<dyn OutboundSink>),
        );

        let updates = Arc::new(UpdateManager::new(store.clone()));
        if self.simulate.unwrap_or(manifest.config.mock_mode) {
            let simulator = Simulator::new(
                manifest.clone(),
                SimulationConfig {
                    variance: settings.simulation_variance,
                    interval: settings.simulation_interval(),
                    seed: self.simulation_seed,
                },
            );
            updates.add_source(Box::new(simulator));
        }

        info!(
            "Runtime ready for '{}' ({} workflows, {} sources)",
            manifest.meta.name,
            manifest.domain.workflows.len(),
            updates.source_count()
        );

        DashboardRuntime {
            mqtt: MqttRouter::from_manifest(&manifest),
            http: HttpIngest::from_manifest(&manifest),
            manifest,
            settings,
            store,
            data,
            resolver,
            renderer,
            workflows,
            dispatcher,
            updates,
            _workflow_subscription: workflow_subscription,
        }
    }
}

/// One dashboard: a manifest plus all live state derived from it
pub struct DashboardRuntime {
    manifest: Arc<AppManifest>,
    settings: Settings,
    store: Arc<SignalStore>,
    data: Arc<DataRegistry>,
    resolver: Arc<SignalResolver>,
    renderer: Renderer,
    workflows: Arc<WorkflowEngine>,
    dispatcher: ActionDispatcher,
    updates: Arc<UpdateManager>,
    mqtt: MqttRouter,
    http: HttpIngest,
    _workflow_subscription: Subscription,
}

impl DashboardRuntime {
    pub fn builder(manifest: Arc<AppManifest>, settings: Settings) -> RuntimeBuilder {
        RuntimeBuilder {
            manifest,
            settings,
            storage: None,
            clock: None,
            registry: None,
            seeds: None,
            effects: None,
            sink: None,
            simulate: None,
            simulation_seed: None,
        }
    }

    pub fn manifest(&self) -> &Arc<AppManifest> {
        &self.manifest
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<SignalStore> {
        &self.store
    }

    pub fn data(&self) -> &Arc<DataRegistry> {
        &self.data
    }

    pub fn workflows(&self) -> &Arc<WorkflowEngine> {
        &self.workflows
    }

    pub fn updates(&self) -> &Arc<UpdateManager> {
        &self.updates
    }

    pub fn mqtt(&self) -> &MqttRouter {
        &self.mqtt
    }

    pub fn http(&self) -> &HttpIngest {
        &self.http
    }

    /// Render a page against the store as it is right now
    pub fn render_page(&self, page_id: &str) -> PageView {
        let snapshot = self.store.snapshot();
        let now = self.store.clock().now_ms();
        self.renderer.render_page(page_id, &snapshot, now)
    }

    pub fn resolve_signal(&self, signal_id: &str) -> ResolvedSignal {
        self.resolver.resolve_signal(signal_id)
    }

    pub fn resolve_data(&self, data_id: &str) -> Option<Rows> {
        self.data.resolve_data(data_id)
    }

    pub fn send_action(&self, entity_id: &str, value: Value) -> DispatchOutcome {
        self.dispatcher.send_action(entity_id, value)
    }

    pub fn trigger_workflow(&self, workflow_id: &str) -> bool {
        self.workflows.trigger_workflow(workflow_id)
    }

    /// Open a collection for editing, seeding it first if needed
    pub fn open_collection(&self, collection: &str) -> CrudStore {
        if self.data.resolve_data(collection).is_none() {
            warn!("Opening collection '{}' with no seed data", collection);
        }
        CrudStore::open(
            self.data.storage().clone(),
            self.data.namespace().key(collection),
            Vec::new(),
        )
    }

    /// Feed one MQTT message into the store
    pub fn ingest_mqtt(&self, topic: &str, payload: &[u8]) -> bool {
        self.mqtt.ingest(&self.store, topic, payload)
    }

    /// Feed one HTTP response body into the store; returns signals updated
    pub fn ingest_http(&self, endpoint: &str, body: &Value) -> usize {
        self.http.ingest(&self.store, endpoint, body)
    }

    /// Poll every due source at the clock's current time
    pub fn tick(&self) -> usize {
        self.updates.tick_due(self.store.clock().now_ms())
    }

    /// Drive sources until [`stop`](Self::stop) is called
    pub async fn run(&self) {
        self.updates.run(UPDATE_LOOP_BASE_INTERVAL).await;
    }

    pub fn stop(&self) {
        self.updates.stop();
    }
}
