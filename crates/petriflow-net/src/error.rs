use thiserror::Error;

use crate::ledger::TokenId;

#[derive(Debug, Error, PartialEq)]
pub enum NetError {
  #[error("transition {transition} does not exist")]
  UnknownTransition { transition: usize },

  #[error("transition {transition} is not enabled")]
  NotEnabled { transition: usize },

  #[error("token {token} is not in an input place of transition {transition}")]
  TokenNotPresent { token: TokenId, transition: usize },

  #[error("{what}: expected {expected} entries, got {actual}")]
  DimensionMismatch {
    what: String,
    expected: usize,
    actual: usize,
  },

  #[error("unsupported value for '{key}': {kind} values cannot be stored as variables")]
  UnsupportedValue { key: String, kind: &'static str },
}
