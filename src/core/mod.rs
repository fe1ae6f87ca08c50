//! Dashboard engine: data, rendering, workflows and the runtime tying them together

pub mod actions;
mod crud;
mod data_registry;
mod file_storage;
pub mod renderer;
mod resolver;
mod runtime;
mod update_manager;
pub mod workflow;

pub use actions::{ActionDispatcher, DispatchOutcome, LogSink, Outbound, OutboundSink};
pub use crud::CrudStore;
pub use data_registry::{DataRegistry, Rows};
pub use file_storage::FileStorage;
pub use renderer::{
    ActionBinding, PageView, RenderedBlock, RenderedPage, RenderedSection, Renderer, ENTITY_ID_PROP,
};
pub use resolver::{is_truthy, ResolvedSignal, SignalResolver};
pub use runtime::{DashboardRuntime, RuntimeBuilder};
pub use update_manager::UpdateManager;
pub use workflow::{
    agent_reply, check_condition, ActionContext, ActionHandler, EffectSink, LogEffects, Severity,
    WorkflowEngine, AGENT_THINKING,
};
