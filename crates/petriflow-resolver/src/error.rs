use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or compiling a process definition.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// Two places share an id.
  #[error("duplicate place id: {place_id}")]
  DuplicatePlace { place_id: String },

  /// Two transitions share an id.
  #[error("duplicate transition id: {transition_id}")]
  DuplicateTransition { transition_id: String },

  /// An arc endpoint that should be a place is not one.
  #[error("invalid arc: place '{place_id}' does not exist")]
  UnknownPlace { place_id: String },

  /// An arc endpoint that should be a transition is not one.
  #[error("invalid arc: transition '{transition_id}' does not exist")]
  UnknownTransition { transition_id: String },

  #[error("failed to parse YAML definition: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("failed to parse JSON definition: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unsupported definition file extension: {}", path.display())]
  UnsupportedFormat { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The compiled matrices were rejected by the net model.
  #[error("invalid net: {0}")]
  Net(#[from] petriflow_net::NetError),
}
