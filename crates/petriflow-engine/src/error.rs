use petriflow_net::{NetError, TokenId};

/// Errors returned by flow operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FlowError {
  /// Required variables were absent from the supplied data.
  #[error("missing required fields: {}", fields.join(", "))]
  MissingFields { fields: Vec<String> },

  #[error("transition {transition} is not enabled")]
  NotEnabled { transition: usize },

  #[error("token {token} is not registered for a pending transition")]
  TokenNotPresent { token: TokenId },

  #[error("transition {transition} does not exist")]
  UnknownTransition { transition: usize },

  #[error("flow has not been started")]
  NotStarted,

  #[error("flow has already been started")]
  AlreadyStarted,

  /// Self-firing transitions kept the dispatcher busy past the limit,
  /// usually an AUTO cycle.
  #[error("dispatch exceeded {limit} automatic fires")]
  AutoFireLimit { limit: usize },

  /// The engine is missing a collaborator it needs to proceed.
  #[error("configuration error: {message}")]
  Configuration { message: String },

  /// A collaborator reported a failure.
  #[error("collaborator failed: {message}")]
  Collaborator { message: String },

  #[error("net error: {0}")]
  Net(NetError),
}

impl From<NetError> for FlowError {
  fn from(err: NetError) -> Self {
    match err {
      NetError::NotEnabled { transition } => FlowError::NotEnabled { transition },
      NetError::UnknownTransition { transition } => FlowError::UnknownTransition { transition },
      NetError::TokenNotPresent { token, .. } => FlowError::TokenNotPresent { token },
      other => FlowError::Net(other),
    }
  }
}

impl FlowError {
  pub(crate) fn configuration(message: impl Into<String>) -> Self {
    FlowError::Configuration {
      message: message.into(),
    }
  }
}
