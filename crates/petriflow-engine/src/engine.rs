use std::future::Future;
use std::sync::Arc;

use petriflow_net::Process;
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::FlowError;
use crate::flow::{Flow, FlowHandle, ParentLink};
use crate::hooks::Handlers;

/// Creates flows and carries the configuration and hooks they share.
///
/// Cloning is cheap; every flow keeps a clone so its asynchronous
/// completions can reach the same hooks and runtime.
#[derive(Clone)]
pub struct Engine {
  inner: Arc<EngineInner>,
}

struct EngineInner {
  config: EngineConfig,
  handlers: Handlers,
  runtime: Handle,
}

impl Engine {
  /// Create an engine bound to the current tokio runtime.
  ///
  /// # Errors
  /// Returns a configuration error when called outside a runtime.
  pub fn new(config: EngineConfig, handlers: Handlers) -> Result<Self, FlowError> {
    let runtime = Handle::try_current()
      .map_err(|e| FlowError::configuration(format!("no tokio runtime available: {}", e)))?;

    Ok(Self {
      inner: Arc::new(EngineInner {
        config,
        handlers,
        runtime,
      }),
    })
  }

  pub fn config(&self) -> &EngineConfig {
    &self.inner.config
  }

  pub fn handlers(&self) -> &Handlers {
    &self.inner.handlers
  }

  /// Create an unstarted root flow for `process`.
  pub fn create_flow(&self, process: Arc<Process>, owner: impl Into<String>) -> FlowHandle {
    self.create(process, owner.into(), None)
  }

  pub(crate) fn create(
    &self,
    process: Arc<Process>,
    owner: String,
    parent: Option<ParentLink>,
  ) -> FlowHandle {
    let handle = Flow::create(self.clone(), process, owner, parent);
    debug!(flow_id = %handle.id(), "flow_created");

    if let Some(hook) = &self.inner.handlers.on_flow_created {
      hook(&handle);
    }
    handle
  }

  pub(crate) fn spawn<F>(&self, future: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.inner.runtime.spawn(future);
  }
}
