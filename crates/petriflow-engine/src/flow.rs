use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use petriflow_net::{Net, Process, TokenId, TransitionKinds, Variables};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, TryLockError};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::FlowError;
use crate::gate::{merge_declared, missing_required};

/// Identifier of a flow.
pub type FlowId = Uuid;

/// Links a subprocess flow to the parent token waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParentLink {
  pub flow: FlowId,
  pub token: TokenId,
}

/// A running instance of a [`Process`].
///
/// Flows are only reachable through a [`FlowHandle`], which serializes
/// every operation on the flow behind one lock. Hooks receive `&Flow`
/// while that lock is held.
pub struct Flow {
  pub(crate) id: FlowId,
  pub(crate) owner: String,
  pub(crate) net: Net,
  pub(crate) variables: Variables,
  /// Tokens with a pending asynchronous action, and the transition each
  /// one waits on.
  pub(crate) in_progress: BTreeMap<TokenId, usize>,
  pub(crate) parent: Option<ParentLink>,
  pub(crate) running_sub_processes: Vec<FlowId>,
  pub(crate) started: bool,
  pub(crate) completed: bool,
  pub(crate) engine: Engine,
  this: Weak<Mutex<Flow>>,
}

impl Flow {
  pub(crate) fn create(
    engine: Engine,
    process: Arc<Process>,
    owner: String,
    parent: Option<ParentLink>,
  ) -> FlowHandle {
    let id = Uuid::new_v4();
    let inner = Arc::new_cyclic(|this| {
      Mutex::new(Flow {
        id,
        owner,
        net: Net::new(process),
        variables: Variables::new(),
        in_progress: BTreeMap::new(),
        parent,
        running_sub_processes: Vec::new(),
        started: false,
        completed: false,
        engine,
        this: this.clone(),
      })
    });
    FlowHandle { id, inner }
  }

  pub fn id(&self) -> FlowId {
    self.id
  }

  pub fn owner(&self) -> &str {
    &self.owner
  }

  pub fn process(&self) -> &Arc<Process> {
    self.net.process()
  }

  /// Token count per place.
  pub fn state(&self) -> Vec<u32> {
    self.net.state()
  }

  /// Token identities in a place, oldest first.
  pub fn tokens(&self, place: usize) -> Vec<TokenId> {
    self.net.tokens(place).collect()
  }

  pub fn variables(&self) -> &Variables {
    &self.variables
  }

  pub fn enabled_transitions(&self) -> &[usize] {
    self.net.enabled()
  }

  /// Enabled transitions waiting on a caller.
  pub fn user_transitions(&self) -> Vec<usize> {
    let process = self.net.process();
    self
      .net
      .enabled()
      .iter()
      .copied()
      .filter(|t| process.kinds(*t).contains(TransitionKinds::USER))
      .collect()
  }

  pub fn in_progress(&self) -> &BTreeMap<TokenId, usize> {
    &self.in_progress
  }

  /// Transition a token is registered under, if any.
  pub fn pending_transition(&self, token: TokenId) -> Option<usize> {
    self.in_progress.get(&token).copied()
  }

  pub fn parent(&self) -> Option<ParentLink> {
    self.parent
  }

  pub fn running_sub_processes(&self) -> &[FlowId] {
    &self.running_sub_processes
  }

  pub fn is_started(&self) -> bool {
    self.started
  }

  pub fn is_completed(&self) -> bool {
    self.completed
  }

  pub fn snapshot(&self) -> FlowSnapshot {
    let places = self.net.process().places();
    FlowSnapshot {
      id: self.id,
      process: self.net.process().name().to_string(),
      owner: self.owner.clone(),
      state: self.state(),
      tokens: (0..places).map(|p| self.tokens(p)).collect(),
      enabled_transitions: self.net.enabled().to_vec(),
      user_transitions: self.user_transitions(),
      in_progress: self.in_progress.clone(),
      variables: self.variables.clone(),
      parent: self.parent,
      running_sub_processes: self.running_sub_processes.clone(),
      started: self.started,
      completed: self.completed,
    }
  }

  pub(crate) fn handle(&self) -> Option<FlowHandle> {
    self.this.upgrade().map(|inner| FlowHandle { id: self.id, inner })
  }

  pub(crate) fn start(&mut self, data: Variables) -> Result<Vec<usize>, FlowError> {
    if self.started {
      return Err(FlowError::AlreadyStarted);
    }

    let process = Arc::clone(self.net.process());
    let missing = missing_required(process.start_variables(), &data);
    if !missing.is_empty() {
      return Err(FlowError::MissingFields { fields: missing });
    }

    merge_declared(&process, &mut self.variables, data);
    self.started = true;
    self.net.init(&self.variables);

    info!(
      flow_id = %self.id,
      process = %process.name(),
      owner = %self.owner,
      parent_id = ?self.parent.map(|p| p.flow),
      "flow_started"
    );

    let engine = self.engine.clone();
    match self.parent {
      Some(link) => {
        if let Some(hook) = &engine.handlers().on_subprocess_started {
          hook(self, link.token);
        }
      }
      None => {
        if let Some(hook) = &engine.handlers().on_process_started {
          hook(self);
        }
      }
    }

    self.dispatch()?;
    Ok(self.net.enabled().to_vec())
  }

  pub(crate) fn fire(&mut self, transition: usize, data: Variables) -> Result<Vec<usize>, FlowError> {
    if !self.started {
      return Err(FlowError::NotStarted);
    }

    let process = Arc::clone(self.net.process());
    let definition = process
      .transition(transition)
      .ok_or(FlowError::UnknownTransition { transition })?;

    let missing = missing_required(&definition.required_variables, &data);
    if !missing.is_empty() {
      return Err(FlowError::MissingFields { fields: missing });
    }
    if !self.net.is_enabled(transition) {
      return Err(FlowError::NotEnabled { transition });
    }

    merge_declared(&process, &mut self.variables, data);
    self.net.fire(transition, &self.variables)?;
    debug!(flow_id = %self.id, transition, "transition_fired");

    self.after_fire(transition)
  }

  pub(crate) fn fire_system_task(
    &mut self,
    token: TokenId,
    data: Variables,
  ) -> Result<Vec<usize>, FlowError> {
    let transition = self.check_system_task(token, &data)?;
    self.complete_system_task(transition, token, data)
  }

  /// Everything that can reject a system task completion, checked before
  /// the flow is touched.
  fn check_system_task(&self, token: TokenId, data: &Variables) -> Result<usize, FlowError> {
    let transition = self
      .pending_transition(token)
      .ok_or(FlowError::TokenNotPresent { token })?;

    let required = self
      .net
      .process()
      .transition(transition)
      .map(|t| t.required_variables.as_slice())
      .unwrap_or_default();
    let missing = missing_required(required, data);
    if !missing.is_empty() {
      return Err(FlowError::MissingFields { fields: missing });
    }

    self.net.can_fire_with_token(transition, token)?;
    Ok(transition)
  }

  fn complete_system_task(
    &mut self,
    transition: usize,
    token: TokenId,
    data: Variables,
  ) -> Result<Vec<usize>, FlowError> {
    let process = Arc::clone(self.net.process());
    merge_declared(&process, &mut self.variables, data);
    self.in_progress.remove(&token);
    self.net.fire_with_token(transition, token, &self.variables)?;
    debug!(flow_id = %self.id, transition, token = %token, "transition_fired");

    self.after_fire(transition)
  }

  /// Resume the transition a finished subprocess was spawned for.
  pub(crate) fn join_subprocess(
    &mut self,
    child: FlowId,
    token: TokenId,
    data: Variables,
  ) -> Result<Vec<usize>, FlowError> {
    let transition = self.check_system_task(token, &data)?;
    self.running_sub_processes.retain(|id| *id != child);
    debug!(flow_id = %self.id, child_id = %child, token = %token, "subprocess_joined");
    self.complete_system_task(transition, token, data)
  }

  fn after_fire(&mut self, transition: usize) -> Result<Vec<usize>, FlowError> {
    let engine = self.engine.clone();
    if let Some(hook) = &engine.handlers().on_fire_completed {
      hook(self, transition);
    }

    self.dispatch()?;
    Ok(self.net.enabled().to_vec())
  }
}

/// A cloneable handle to a flow.
///
/// Every operation takes the flow's lock for its full duration, including
/// the dispatch pass it triggers.
#[derive(Clone)]
pub struct FlowHandle {
  id: FlowId,
  pub(crate) inner: Arc<Mutex<Flow>>,
}

impl FlowHandle {
  pub fn id(&self) -> FlowId {
    self.id
  }

  /// Lock the flow for reading.
  ///
  /// Do not hold the guard across calls to this handle's other methods.
  pub async fn lock(&self) -> MutexGuard<'_, Flow> {
    self.inner.lock().await
  }

  pub(crate) fn try_lock(&self) -> Result<MutexGuard<'_, Flow>, TryLockError> {
    self.inner.try_lock()
  }

  /// Validate `data` against the start variables, merge it and run the
  /// first dispatch pass. Returns the enabled transitions afterwards.
  pub async fn start(&self, data: Variables) -> Result<Vec<usize>, FlowError> {
    self.inner.lock().await.start(data)
  }

  /// Fire a transition with caller-supplied data.
  pub async fn fire(&self, transition: usize, data: Variables) -> Result<Vec<usize>, FlowError> {
    self.inner.lock().await.fire(transition, data)
  }

  /// Complete the pending action registered for `token`.
  pub async fn fire_system_task(
    &self,
    token: TokenId,
    data: Variables,
  ) -> Result<Vec<usize>, FlowError> {
    self.inner.lock().await.fire_system_task(token, data)
  }

  pub(crate) async fn join_subprocess(
    &self,
    child: FlowId,
    token: TokenId,
    data: Variables,
  ) -> Result<Vec<usize>, FlowError> {
    self.inner.lock().await.join_subprocess(child, token, data)
  }

  pub async fn variables(&self) -> Variables {
    self.inner.lock().await.variables.clone()
  }

  pub async fn state(&self) -> Vec<u32> {
    self.inner.lock().await.state()
  }

  pub async fn enabled_transitions(&self) -> Vec<usize> {
    self.inner.lock().await.enabled_transitions().to_vec()
  }

  pub async fn user_transitions(&self) -> Vec<usize> {
    self.inner.lock().await.user_transitions()
  }

  pub async fn is_completed(&self) -> bool {
    self.inner.lock().await.completed
  }

  pub async fn snapshot(&self) -> FlowSnapshot {
    self.inner.lock().await.snapshot()
  }
}

impl fmt::Debug for FlowHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FlowHandle").field("id", &self.id).finish()
  }
}

/// Point-in-time view of a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSnapshot {
  pub id: FlowId,
  pub process: String,
  pub owner: String,
  pub state: Vec<u32>,
  pub tokens: Vec<Vec<TokenId>>,
  pub enabled_transitions: Vec<usize>,
  pub user_transitions: Vec<usize>,
  pub in_progress: BTreeMap<TokenId, usize>,
  pub variables: Variables,
  pub parent: Option<ParentLink>,
  pub running_sub_processes: Vec<FlowId>,
  pub started: bool,
  pub completed: bool,
}
