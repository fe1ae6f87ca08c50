//! Workflow engine - watches signals and fires manifest-declared actions.
//!
//! Workflows are evaluated in manifest order against a signal snapshot.
//! In `Edge` mode a workflow fires once when its condition becomes true and
//! re-arms when the condition is false again; `Continuous` fires on every
//! evaluation while the condition holds.

use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use ramme_core::{SignalSnapshot, SignalStore, Subscription};
use ramme_types::{
    Action, ActionDefinition, AppManifest, Condition, FireMode, WorkflowDefinition,
    SIGNAL_CHANGE_TRIGGER,
};

pub const AGENT_THINKING: &str = "AI Agent Analyzing...";
const AGENT_HEALTHY: &str = "System Operating Normally.";
const AGENT_OPTIMIZE: &str = "Optimization Recommended.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
}

/// Side effects of built-in actions, provided by the embedding UI
pub trait EffectSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
    fn navigate(&self, path: &str);
}

/// Effect sink that writes everything to the log
#[derive(Debug, Default)]
pub struct LogEffects;

impl EffectSink for LogEffects {
    fn notify(&self, message: &str, severity: Severity) {
        info!("[Notify:{:?}] {}", severity, message);
    }

    fn navigate(&self, path: &str) {
        info!("[Navigate] {}", path);
    }
}

/// Why an action is running
#[derive(Debug, Clone, PartialEq)]
pub enum ActionContext {
    Signal { signal_id: String, value: Value },
    Manual,
}

/// Handler for an action type the engine does not know
pub type ActionHandler = Arc<dyn Fn(&Map<String, Value>, &ActionContext) + Send + Sync>;

/// Canned agent reply for a prompt
pub fn agent_reply(prompt: &str) -> &'static str {
    if prompt.contains("health") {
        AGENT_HEALTHY
    } else {
        AGENT_OPTIMIZE
    }
}

/// Numeric view of a signal value: numbers, numeric strings, booleans as 1/0
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Evaluate a `<op> <number>` condition; malformed conditions or non-numeric values are never met
pub fn check_condition(value: &Value, condition: &str) -> bool {
    let Some(value) = numeric(value) else {
        return false;
    };
    match Condition::parse(condition) {
        Some(condition) => condition.is_met(value),
        None => {
            debug!("Unparseable workflow condition: {:?}", condition);
            false
        }
    }
}

pub struct WorkflowEngine {
    manifest: Arc<AppManifest>,
    effects: Arc<dyn EffectSink>,
    mode: FireMode,
    handlers: RwLock<HashMap<String, ActionHandler>>,
    /// Workflow id -> condition held at the previous evaluation
    was_met: Mutex<HashMap<String, bool>>,
}

impl WorkflowEngine {
    pub fn new(manifest: Arc<AppManifest>, effects: Arc<dyn EffectSink>, mode: FireMode) -> Self {
        Self {
            manifest,
            effects,
            mode,
            handlers: RwLock::new(HashMap::new()),
            was_met: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> FireMode {
        self.mode
    }

    /// Handle a non built-in action type
    pub fn register_handler<F>(&self, action_type: &str, handler: F)
    where
        F: Fn(&Map<String, Value>, &ActionContext) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.insert(action_type.to_string(), Arc::new(handler));
        }
    }

    /// Evaluate every active workflow against `snapshot`; returns the ids that fired
    pub fn evaluate(&self, snapshot: &SignalSnapshot) -> Vec<String> {
        let mut due: Vec<(&WorkflowDefinition, ActionContext)> = Vec::new();
        {
            let Ok(mut was_met) = self.was_met.lock() else {
                warn!("Workflow state lock poisoned, skipping evaluation");
                return Vec::new();
            };
            for flow in self.manifest.domain.workflows.iter().filter(|f| f.active) {
                if flow.trigger.trigger_type != SIGNAL_CHANGE_TRIGGER {
                    debug!("Workflow '{}' has unsupported trigger '{}'", flow.id, flow.trigger.trigger_type);
                    continue;
                }
                let config = &flow.trigger.config;
                let current = snapshot.get(&config.signal_id).map(|v| &v.value);
                let met = current.is_some_and(|value| check_condition(value, &config.condition));

                let previously = was_met.insert(flow.id.clone(), met).unwrap_or(false);
                let fire = match self.mode {
                    FireMode::Edge => met && !previously,
                    FireMode::Continuous => met,
                };
                if let (true, Some(value)) = (fire, current) {
                    due.push((
                        flow,
                        ActionContext::Signal {
                            signal_id: config.signal_id.clone(),
                            value: value.clone(),
                        },
                    ));
                }
            }
        }

        // Actions run without the state lock held; handlers may write the store
        due.into_iter()
            .map(|(flow, context)| {
                info!("[Engine] Trigger Fired: {}", flow.name);
                self.run_actions(&flow.actions, &context);
                flow.id.clone()
            })
            .collect()
    }

    /// Run a workflow's actions now, whatever its trigger or active flag
    pub fn trigger_workflow(&self, workflow_id: &str) -> bool {
        match self.manifest.domain.workflows.iter().find(|f| f.id == workflow_id) {
            Some(flow) => {
                info!("[Engine] Manual trigger: {}", flow.name);
                self.run_actions(&flow.actions, &ActionContext::Manual);
                true
            }
            None => {
                warn!("[Engine] Workflow not found: {}", workflow_id);
                false
            }
        }
    }

    /// Re-evaluate on every store write until the subscription is dropped
    pub fn attach(self: &Arc<Self>, store: &SignalStore) -> Subscription {
        let engine = Arc::clone(self);
        store.subscribe(move |_change, snapshot| {
            engine.evaluate(snapshot);
        })
    }

    fn run_actions(&self, actions: &[ActionDefinition], context: &ActionContext) {
        for definition in actions {
            debug!("[Engine] Executing: {}", definition.action_type);
            self.execute(Action::from(definition), context);
        }
    }

    fn execute(&self, action: Action, context: &ActionContext) {
        match action {
            Action::SendNotification { message } => self.effects.notify(
                message.as_deref().unwrap_or("Notification Sent"),
                Severity::Info,
            ),
            Action::UpdateResource { config } => self.effects.notify(
                &format!("Updating Resource: {}", Value::Object(config)),
                Severity::Success,
            ),
            Action::AgentTask { prompt } => {
                let prompt = prompt.unwrap_or_default();
                info!("[AI Agent] Thinking about: {:?}", prompt);
                self.effects.notify(AGENT_THINKING, Severity::Info);
                self.effects
                    .notify(&format!("Agent: \"{}\"", agent_reply(&prompt)), Severity::Success);
            }
            Action::Navigate { path: Some(path) } => self.effects.navigate(&path),
            Action::Navigate { path: None } => warn!("[Engine] navigate action without a path"),
            Action::Unknown {
                action_type,
                config,
            } => {
                let handler = self
                    .handlers
                    .read()
                    .ok()
                    .and_then(|handlers| handlers.get(&action_type).cloned());
                match handler {
                    Some(handler) => handler(&config, context),
                    None => warn!("Unknown action type: {}", action_type),
                }
            }
        }
    }
}
