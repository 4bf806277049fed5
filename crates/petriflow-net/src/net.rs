use std::sync::Arc;

use tracing::trace;

use crate::condition::evaluate_conditions;
use crate::error::NetError;
use crate::ledger::{TokenId, TokenLedger};
use crate::process::Process;
use crate::value::Variables;

/// The mutable marking of one flow over a shared [`Process`].
///
/// A new net holds no tokens and enables nothing. [`Net::init`] mints the
/// process's initial marking. After that the net only changes through
/// [`Net::fire`] and [`Net::fire_with_token`], each of which recomputes the
/// enabled set over every transition.
#[derive(Debug, Clone)]
pub struct Net {
  process: Arc<Process>,
  ledger: TokenLedger,
  enabled: Vec<usize>,
  initialized: bool,
}

impl Net {
  pub fn new(process: Arc<Process>) -> Self {
    let ledger = TokenLedger::new(process.places());
    Self {
      process,
      ledger,
      enabled: Vec::new(),
      initialized: false,
    }
  }

  /// Mint the initial marking and compute the first enabled set.
  ///
  /// Calling this again on an initialized net only refreshes enabling.
  pub fn init(&mut self, variables: &Variables) {
    if !self.initialized {
      for (place, count) in self.process.initial_state().iter().enumerate() {
        if *count > 0 {
          self.ledger.mint(place, *count);
        }
      }
      self.initialized = true;
    }
    self.refresh(variables);
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn process(&self) -> &Arc<Process> {
    &self.process
  }

  /// Token count per place.
  pub fn state(&self) -> Vec<u32> {
    self.ledger.counts()
  }

  pub fn ledger(&self) -> &TokenLedger {
    &self.ledger
  }

  /// Token identities in a place, oldest first.
  pub fn tokens(&self, place: usize) -> impl Iterator<Item = TokenId> + '_ {
    self.ledger.tokens(place)
  }

  /// Currently enabled transitions in index order.
  pub fn enabled(&self) -> &[usize] {
    &self.enabled
  }

  pub fn is_enabled(&self, transition: usize) -> bool {
    self.enabled.contains(&transition)
  }

  /// Evaluate the enabling rule for one transition against the current
  /// marking.
  pub fn check_enabled(&self, transition: usize, variables: &Variables) -> bool {
    if transition >= self.process.transition_count() {
      return false;
    }
    let marked = self
      .process
      .input_places(transition)
      .all(|(place, weight)| self.ledger.count(place) >= weight);

    marked && evaluate_conditions(self.process.conditions(transition), variables)
  }

  /// Recompute the enabled set over the whole net.
  pub fn refresh(&mut self, variables: &Variables) {
    self.enabled = (0..self.process.transition_count())
      .filter(|t| self.check_enabled(*t, variables))
      .collect();
  }

  /// Fire a transition, consuming the oldest tokens of every input place.
  ///
  /// Returns the transitions that became enabled by this fire.
  pub fn fire(&mut self, transition: usize, variables: &Variables) -> Result<Vec<usize>, NetError> {
    self.ensure_enabled(transition)?;

    let process = Arc::clone(&self.process);
    for (place, weight) in process.input_places(transition) {
      self.consume(place, weight, None, transition)?;
    }

    Ok(self.produce(transition, variables))
  }

  /// Fire a transition, consuming `token` from the input place holding it.
  ///
  /// The remaining weight of that place, and every other input place, is
  /// taken oldest first.
  pub fn fire_with_token(
    &mut self,
    transition: usize,
    token: TokenId,
    variables: &Variables,
  ) -> Result<Vec<usize>, NetError> {
    let holding = self.can_fire_with_token(transition, token)?;

    let process = Arc::clone(&self.process);
    for (place, weight) in process.input_places(transition) {
      let pinned = (place == holding).then_some(token);
      self.consume(place, weight, pinned, transition)?;
    }

    Ok(self.produce(transition, variables))
  }

  /// Check that [`Net::fire_with_token`] would succeed without changing
  /// anything. Returns the input place holding `token`.
  pub fn can_fire_with_token(&self, transition: usize, token: TokenId) -> Result<usize, NetError> {
    if transition >= self.process.transition_count() {
      return Err(NetError::UnknownTransition { transition });
    }

    let holding = self
      .ledger
      .locate(token)
      .filter(|place| self.process.input_weights(transition).get(*place).copied().unwrap_or(0) > 0)
      .ok_or(NetError::TokenNotPresent { token, transition })?;

    self.ensure_enabled(transition)?;
    Ok(holding)
  }

  fn ensure_enabled(&self, transition: usize) -> Result<(), NetError> {
    if transition >= self.process.transition_count() {
      return Err(NetError::UnknownTransition { transition });
    }
    if !self.is_enabled(transition) {
      return Err(NetError::NotEnabled { transition });
    }
    Ok(())
  }

  // The enabled set guarantees every input place holds its weight, so
  // consumption cannot come up short.
  fn consume(
    &mut self,
    place: usize,
    weight: u32,
    pinned: Option<TokenId>,
    transition: usize,
  ) -> Result<(), NetError> {
    let mut remaining = weight;
    if let Some(token) = pinned {
      if !self.ledger.take(place, token) {
        return Err(NetError::TokenNotPresent { token, transition });
      }
      remaining -= 1;
    }
    if remaining > 0 {
      self
        .ledger
        .take_oldest(place, remaining)
        .ok_or(NetError::NotEnabled { transition })?;
    }
    Ok(())
  }

  fn produce(&mut self, transition: usize, variables: &Variables) -> Vec<usize> {
    let process = Arc::clone(&self.process);
    for (place, weight) in process.output_places(transition) {
      let minted = self.ledger.mint(place, weight);
      trace!(transition, place, tokens = ?minted, "tokens minted");
    }

    let before = std::mem::take(&mut self.enabled);
    self.refresh(variables);
    self
      .enabled
      .iter()
      .copied()
      .filter(|t| !before.contains(t))
      .collect()
  }
}
