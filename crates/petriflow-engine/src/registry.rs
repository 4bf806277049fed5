//! In-memory flow registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::flow::{FlowHandle, FlowId};

/// Holds flow handles by id.
///
/// Wire it into an engine with [`Handlers::with_registry`](crate::Handlers::with_registry)
/// so subprocess flows can find their parent when they complete.
#[derive(Clone, Default)]
pub struct FlowRegistry {
  flows: Arc<RwLock<HashMap<FlowId, FlowHandle>>>,
}

impl FlowRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&self, handle: FlowHandle) {
    let mut flows = self.flows.write().unwrap_or_else(PoisonError::into_inner);
    flows.insert(handle.id(), handle);
  }

  pub fn get(&self, id: FlowId) -> Option<FlowHandle> {
    let flows = self.flows.read().unwrap_or_else(PoisonError::into_inner);
    flows.get(&id).cloned()
  }

  pub fn remove(&self, id: FlowId) -> Option<FlowHandle> {
    let mut flows = self.flows.write().unwrap_or_else(PoisonError::into_inner);
    flows.remove(&id)
  }

  pub fn ids(&self) -> Vec<FlowId> {
    let flows = self.flows.read().unwrap_or_else(PoisonError::into_inner);
    flows.keys().copied().collect()
  }

  pub fn len(&self) -> usize {
    self.flows.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
