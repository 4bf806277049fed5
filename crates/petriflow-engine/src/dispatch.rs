//! The dispatcher drives a flow forward after every state change.
//!
//! A pass first fires self-firing transitions (AUTO, then MESSAGE) one at a
//! time, always picking the lowest enabled index, until none is enabled.
//! It then walks every token in the input places of the enabled
//! transitions and hands unregistered tokens to their asynchronous action:
//! a timer, a system task or a subprocess. Registration in
//! `in_progress` makes the pass idempotent. Finally, a flow with nothing
//! enabled is marked completed and, if it is a subprocess, its parent is
//! joined from a separate task.

use std::sync::Arc;

use petriflow_net::{TokenId, Transition, TransitionKinds};
use tracing::{debug, error, info, warn};

use crate::error::FlowError;
use crate::flow::{Flow, ParentLink};
use crate::gate::parse_delay;

impl Flow {
  pub(crate) fn dispatch(&mut self) -> Result<(), FlowError> {
    self.fire_self_firing()?;
    self.register_tokens()?;
    self.check_completed();
    Ok(())
  }

  fn fire_self_firing(&mut self) -> Result<(), FlowError> {
    let engine = self.engine.clone();
    let process = Arc::clone(self.net.process());
    let limit = engine.config().max_auto_fires;
    let mut fires = 0usize;

    loop {
      let next = self
        .net
        .enabled()
        .iter()
        .copied()
        .find(|t| process.kinds(*t).is_self_firing());
      let Some(transition) = next else {
        return Ok(());
      };

      if fires >= limit {
        error!(flow_id = %self.id, limit, "auto fire limit reached");
        return Err(FlowError::AutoFireLimit { limit });
      }

      if !process.kinds(transition).contains(TransitionKinds::AUTO) {
        let hook = engine.handlers().on_send_message.as_ref().ok_or_else(|| {
          FlowError::configuration(format!(
            "transition {} is a message transition but no message hook is registered",
            transition
          ))
        })?;
        if !hook(self, transition) {
          return Err(FlowError::Collaborator {
            message: format!("message for transition {} was not sent", transition),
          });
        }
        debug!(flow_id = %self.id, transition, "message_sent");
      }

      self.net.fire(transition, &self.variables)?;
      fires += 1;
      debug!(flow_id = %self.id, transition, "transition_fired");
    }
  }

  fn register_tokens(&mut self) -> Result<(), FlowError> {
    let process = Arc::clone(self.net.process());
    let enabled = self.net.enabled().to_vec();

    for transition in enabled {
      let kinds = process.kinds(transition);
      if !kinds.is_per_token() {
        continue;
      }

      for (place, _) in process.input_places(transition) {
        let tokens: Vec<TokenId> = self.net.tokens(place).collect();
        for token in tokens {
          if kinds.contains(TransitionKinds::TIMED) && !self.in_progress.contains_key(&token) {
            self.schedule_timer(transition, token)?;
          }
          if kinds.contains(TransitionKinds::SYSTEM) && !self.in_progress.contains_key(&token) {
            self.start_system_task(transition, token)?;
          }
          if kinds.contains(TransitionKinds::SUBPROCESS) && !self.in_progress.contains_key(&token) {
            self.spawn_subprocess(transition, token)?;
          }
        }
      }
    }
    Ok(())
  }

  fn schedule_timer(&mut self, transition: usize, token: TokenId) -> Result<(), FlowError> {
    let engine = self.engine.clone();
    let handle = self
      .handle()
      .ok_or_else(|| FlowError::configuration("flow is no longer owned by a handle"))?;
    let delay = parse_delay(
      self
        .net
        .process()
        .transition(transition)
        .and_then(|t| t.detail("delay")),
      engine.config().min_timer_delay,
    );

    self.in_progress.insert(token, transition);
    if let Some(hook) = &engine.handlers().on_timer_started {
      hook(self, transition);
    }
    debug!(
      flow_id = %self.id,
      transition,
      token = %token,
      delay_ms = delay.as_millis() as u64,
      "timer_scheduled"
    );

    engine.spawn(async move {
      tokio::time::sleep(delay).await;
      handle.inner.lock().await.complete_timer(transition, token);
    });
    Ok(())
  }

  pub(crate) fn complete_timer(&mut self, transition: usize, token: TokenId) {
    if self.pending_transition(token) != Some(transition) {
      debug!(flow_id = %self.id, transition, token = %token, "timer no longer registered");
      return;
    }

    self.in_progress.remove(&token);
    let result = self.net.fire_with_token(transition, token, &self.variables);

    let engine = self.engine.clone();
    if let Some(hook) = &engine.handlers().on_timer_completed {
      hook(self, transition);
    }

    match result {
      Ok(_) => {
        debug!(flow_id = %self.id, transition, token = %token, "transition_fired");
        if let Err(e) = self.dispatch() {
          error!(flow_id = %self.id, error = %e, "dispatch after timer failed");
        }
      }
      Err(e) => {
        warn!(flow_id = %self.id, transition, token = %token, error = %e, "timer fire failed");
      }
    }
  }

  fn start_system_task(&mut self, transition: usize, token: TokenId) -> Result<(), FlowError> {
    let engine = self.engine.clone();
    let hook = engine.handlers().on_system_task.as_ref().ok_or_else(|| {
      FlowError::configuration(format!(
        "transition {} is a system transition but no system task hook is registered",
        transition
      ))
    })?;

    if hook(self, token, transition) {
      self.in_progress.insert(token, transition);
      debug!(flow_id = %self.id, transition, token = %token, "system_task_started");
    } else {
      debug!(flow_id = %self.id, transition, token = %token, "system task not accepted");
    }
    Ok(())
  }

  fn spawn_subprocess(&mut self, transition: usize, token: TokenId) -> Result<(), FlowError> {
    let engine = self.engine.clone();
    let loader = engine.handlers().process_loader.as_ref().ok_or_else(|| {
      FlowError::configuration(format!(
        "transition {} starts a subprocess but no process loader is registered",
        transition
      ))
    })?;

    // From here on the token stays registered even if the spawn fails.
    self.in_progress.insert(token, transition);

    let Some(name) = subprocess_name(self.net.process().transition(transition)) else {
      warn!(flow_id = %self.id, transition, "subprocess transition names no process");
      return Ok(());
    };

    let definition = match loader(&name) {
      Ok(definition) => definition,
      Err(e) => {
        error!(
          flow_id = %self.id,
          transition,
          subprocess = %name,
          error = %e,
          "subprocess definition failed to load"
        );
        return Ok(());
      }
    };

    let link = ParentLink {
      flow: self.id,
      token,
    };
    let child = engine.create(definition, self.owner.clone(), Some(link));
    self.running_sub_processes.push(child.id());
    info!(
      flow_id = %self.id,
      child_id = %child.id(),
      subprocess = %name,
      transition,
      token = %token,
      "subprocess_spawned"
    );

    let data = self.variables.clone();
    let started = match child.try_lock() {
      Ok(mut flow) => flow.start(data).map(|_| ()),
      Err(_) => {
        // Something picked up the new flow already; start it once free.
        let child = child.clone();
        engine.spawn(async move {
          if let Err(e) = child.start(data).await {
            error!(child_id = %child.id(), error = %e, "subprocess failed to start");
          }
        });
        Ok(())
      }
    };
    if let Err(e) = started {
      error!(child_id = %child.id(), error = %e, "subprocess failed to start");
    }
    Ok(())
  }

  fn check_completed(&mut self) {
    if self.completed || !self.net.enabled().is_empty() {
      return;
    }
    self.completed = true;
    info!(flow_id = %self.id, process = %self.net.process().name(), "flow_completed");

    let engine = self.engine.clone();
    match self.parent {
      None => {
        if let Some(hook) = &engine.handlers().on_process_completed {
          hook(self);
        }
      }
      Some(link) => {
        if let Some(hook) = &engine.handlers().on_subprocess_completed {
          hook(self, link.token);
        }
        self.schedule_join(link);
      }
    }
  }

  // The parent may be the flow whose dispatch started this one and whose
  // lock is still held, so the join always runs as its own task.
  fn schedule_join(&self, link: ParentLink) {
    let engine = self.engine.clone();
    let child = self.id;
    let data = self.variables.clone();

    self.engine.spawn(async move {
      let Some(loader) = engine.handlers().flow_loader.clone() else {
        error!(child_id = %child, parent_id = %link.flow, "no flow loader registered, cannot join parent");
        return;
      };
      let parent = match loader(link.flow) {
        Ok(parent) => parent,
        Err(e) => {
          error!(child_id = %child, parent_id = %link.flow, error = %e, "parent flow failed to load");
          return;
        }
      };
      if let Err(e) = parent.join_subprocess(child, link.token, data).await {
        error!(
          child_id = %child,
          parent_id = %link.flow,
          token = %link.token,
          error = %e,
          "subprocess join failed"
        );
      }
    });
  }
}

fn subprocess_name(transition: Option<&Transition>) -> Option<String> {
  let transition = transition?;
  transition
    .detail("subprocess")
    .or_else(|| transition.detail("process"))
    .and_then(|v| v.as_str())
    .map(str::to_string)
}
