//! Token identities per place.
//!
//! The ledger is the single source of truth for a flow's marking: the token
//! count of a place is always the length of its identity queue.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a single token, unique within one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
  pub fn new(raw: u64) -> Self {
    Self(raw)
  }

  pub fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for TokenId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Ordered token identities for every place.
///
/// Identities are minted from a counter that never rewinds, so a consumed
/// identity is never handed out again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLedger {
  places: Vec<VecDeque<TokenId>>,
  next: u64,
}

impl TokenLedger {
  pub fn new(places: usize) -> Self {
    Self {
      places: vec![VecDeque::new(); places],
      next: 1,
    }
  }

  pub fn places(&self) -> usize {
    self.places.len()
  }

  /// Token count of a place.
  pub fn count(&self, place: usize) -> u32 {
    self.places.get(place).map_or(0, |q| q.len() as u32)
  }

  /// Token counts of every place.
  pub fn counts(&self) -> Vec<u32> {
    self.places.iter().map(|q| q.len() as u32).collect()
  }

  /// Token identities in a place, oldest first.
  pub fn tokens(&self, place: usize) -> impl Iterator<Item = TokenId> + '_ {
    self.places.get(place).into_iter().flatten().copied()
  }

  /// Place currently holding `token`.
  pub fn locate(&self, token: TokenId) -> Option<usize> {
    self.places.iter().position(|q| q.contains(&token))
  }

  pub fn contains(&self, token: TokenId) -> bool {
    self.locate(token).is_some()
  }

  /// Mint `n` fresh identities into `place`.
  pub fn mint(&mut self, place: usize, n: u32) -> Vec<TokenId> {
    let mut minted = Vec::with_capacity(n as usize);
    for _ in 0..n {
      let token = TokenId(self.next);
      self.next += 1;
      minted.push(token);
    }
    if let Some(queue) = self.places.get_mut(place) {
      queue.extend(minted.iter().copied());
    }
    minted
  }

  /// Remove the `n` oldest identities from `place`.
  ///
  /// Returns `None` and leaves the place untouched when it holds fewer
  /// than `n` tokens.
  pub fn take_oldest(&mut self, place: usize, n: u32) -> Option<Vec<TokenId>> {
    let queue = self.places.get_mut(place)?;
    if queue.len() < n as usize {
      return None;
    }
    Some(queue.drain(..n as usize).collect())
  }

  /// Remove a specific identity from `place`.
  pub fn take(&mut self, place: usize, token: TokenId) -> bool {
    let Some(queue) = self.places.get_mut(place) else {
      return false;
    };
    match queue.iter().position(|t| *t == token) {
      Some(index) => {
        queue.remove(index);
        true
      }
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mint_is_unique_and_ordered() {
    let mut ledger = TokenLedger::new(2);
    let first = ledger.mint(0, 3);
    let second = ledger.mint(1, 2);

    assert_eq!(first, vec![TokenId(1), TokenId(2), TokenId(3)]);
    assert_eq!(second, vec![TokenId(4), TokenId(5)]);
    assert_eq!(ledger.counts(), vec![3, 2]);
  }

  #[test]
  fn test_take_oldest() {
    let mut ledger = TokenLedger::new(1);
    ledger.mint(0, 3);

    assert_eq!(ledger.take_oldest(0, 2), Some(vec![TokenId(1), TokenId(2)]));
    assert_eq!(ledger.tokens(0).collect::<Vec<_>>(), vec![TokenId(3)]);
    assert_eq!(ledger.take_oldest(0, 2), None);
    assert_eq!(ledger.count(0), 1);
  }

  #[test]
  fn test_take_specific_and_locate() {
    let mut ledger = TokenLedger::new(2);
    ledger.mint(0, 1);
    let tokens = ledger.mint(1, 3);

    assert_eq!(ledger.locate(tokens[1]), Some(1));
    assert!(ledger.take(1, tokens[1]));
    assert!(!ledger.take(1, tokens[1]));
    assert_eq!(ledger.locate(tokens[1]), None);
    assert_eq!(ledger.tokens(1).collect::<Vec<_>>(), vec![tokens[0], tokens[2]]);
  }

  #[test]
  fn test_identities_are_never_reused() {
    let mut ledger = TokenLedger::new(1);
    let minted = ledger.mint(0, 1);
    ledger.take_oldest(0, 1);
    let again = ledger.mint(0, 1);

    assert_ne!(minted, again);
  }
}
