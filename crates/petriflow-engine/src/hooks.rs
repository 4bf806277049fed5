//! Collaborator hooks.
//!
//! Every extension point of the engine is an optional function value on
//! [`Handlers`]. Hooks run synchronously while the flow's lock is held, so
//! they receive the flow by reference and must not try to lock it again.

use std::fmt;
use std::sync::Arc;

use petriflow_net::{Process, TokenId};

use crate::flow::{Flow, FlowHandle, FlowId};
use crate::registry::FlowRegistry;

/// Error type returned by loader hooks.
pub type LoaderError = Box<dyn std::error::Error + Send + Sync>;

/// Sends the message of a MESSAGE transition. `true` means fire now.
pub type MessageHook = Arc<dyn Fn(&Flow, usize) -> bool + Send + Sync>;
/// Starts a system task for a token. `true` means the task was accepted
/// and will be completed later through `fire_system_task`.
pub type SystemTaskHook = Arc<dyn Fn(&Flow, TokenId, usize) -> bool + Send + Sync>;
pub type TransitionHook = Arc<dyn Fn(&Flow, usize) + Send + Sync>;
pub type FlowHook = Arc<dyn Fn(&Flow) + Send + Sync>;
/// Receives the parent-side token a subprocess flow is linked to.
pub type TokenHook = Arc<dyn Fn(&Flow, TokenId) + Send + Sync>;
pub type FlowCreatedHook = Arc<dyn Fn(&FlowHandle) + Send + Sync>;
pub type ProcessLoader = Arc<dyn Fn(&str) -> Result<Arc<Process>, LoaderError> + Send + Sync>;
pub type FlowLoader = Arc<dyn Fn(FlowId) -> Result<FlowHandle, LoaderError> + Send + Sync>;

/// The capability set handed to an [`Engine`](crate::Engine).
#[derive(Clone, Default)]
pub struct Handlers {
  pub on_send_message: Option<MessageHook>,
  pub on_system_task: Option<SystemTaskHook>,
  pub on_fire_completed: Option<TransitionHook>,
  pub on_timer_started: Option<TransitionHook>,
  pub on_timer_completed: Option<TransitionHook>,
  pub on_process_started: Option<FlowHook>,
  pub on_process_completed: Option<FlowHook>,
  pub on_subprocess_started: Option<TokenHook>,
  pub on_subprocess_completed: Option<TokenHook>,
  pub on_flow_created: Option<FlowCreatedHook>,
  pub process_loader: Option<ProcessLoader>,
  pub flow_loader: Option<FlowLoader>,
}

impl Handlers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on_send_message(mut self, f: impl Fn(&Flow, usize) -> bool + Send + Sync + 'static) -> Self {
    self.on_send_message = Some(Arc::new(f));
    self
  }

  pub fn on_system_task(
    mut self,
    f: impl Fn(&Flow, TokenId, usize) -> bool + Send + Sync + 'static,
  ) -> Self {
    self.on_system_task = Some(Arc::new(f));
    self
  }

  pub fn on_fire_completed(mut self, f: impl Fn(&Flow, usize) + Send + Sync + 'static) -> Self {
    self.on_fire_completed = Some(Arc::new(f));
    self
  }

  pub fn on_timer_started(mut self, f: impl Fn(&Flow, usize) + Send + Sync + 'static) -> Self {
    self.on_timer_started = Some(Arc::new(f));
    self
  }

  pub fn on_timer_completed(mut self, f: impl Fn(&Flow, usize) + Send + Sync + 'static) -> Self {
    self.on_timer_completed = Some(Arc::new(f));
    self
  }

  pub fn on_process_started(mut self, f: impl Fn(&Flow) + Send + Sync + 'static) -> Self {
    self.on_process_started = Some(Arc::new(f));
    self
  }

  pub fn on_process_completed(mut self, f: impl Fn(&Flow) + Send + Sync + 'static) -> Self {
    self.on_process_completed = Some(Arc::new(f));
    self
  }

  pub fn on_subprocess_started(mut self, f: impl Fn(&Flow, TokenId) + Send + Sync + 'static) -> Self {
    self.on_subprocess_started = Some(Arc::new(f));
    self
  }

  pub fn on_subprocess_completed(
    mut self,
    f: impl Fn(&Flow, TokenId) + Send + Sync + 'static,
  ) -> Self {
    self.on_subprocess_completed = Some(Arc::new(f));
    self
  }

  pub fn on_flow_created(mut self, f: impl Fn(&FlowHandle) + Send + Sync + 'static) -> Self {
    self.on_flow_created = Some(Arc::new(f));
    self
  }

  pub fn process_loader(
    mut self,
    f: impl Fn(&str) -> Result<Arc<Process>, LoaderError> + Send + Sync + 'static,
  ) -> Self {
    self.process_loader = Some(Arc::new(f));
    self
  }

  pub fn flow_loader(
    mut self,
    f: impl Fn(FlowId) -> Result<FlowHandle, LoaderError> + Send + Sync + 'static,
  ) -> Self {
    self.flow_loader = Some(Arc::new(f));
    self
  }

  /// Keep every created flow in `registry` and resolve parent flows from it.
  pub fn with_registry(self, registry: &FlowRegistry) -> Self {
    let store = registry.clone();
    let lookup = registry.clone();
    self
      .on_flow_created(move |handle| store.insert(handle.clone()))
      .flow_loader(move |id| {
        lookup
          .get(id)
          .ok_or_else(|| format!("flow {} not found in registry", id).into())
      })
  }
}

impl fmt::Debug for Handlers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Handlers")
      .field("on_send_message", &self.on_send_message.is_some())
      .field("on_system_task", &self.on_system_task.is_some())
      .field("on_fire_completed", &self.on_fire_completed.is_some())
      .field("on_timer_started", &self.on_timer_started.is_some())
      .field("on_timer_completed", &self.on_timer_completed.is_some())
      .field("on_process_started", &self.on_process_started.is_some())
      .field("on_process_completed", &self.on_process_completed.is_some())
      .field("on_subprocess_started", &self.on_subprocess_started.is_some())
      .field("on_subprocess_completed", &self.on_subprocess_completed.is_some())
      .field("on_flow_created", &self.on_flow_created.is_some())
      .field("process_loader", &self.process_loader.is_some())
      .field("flow_loader", &self.flow_loader.is_some())
      .finish()
  }
}
