use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
  pub id: String,
  /// Free-form type keywords, e.g. "auto", "user form", "timed".
  ///
  /// The resolver matches known keywords case-insensitively and combines
  /// every match into the transition's kind bitmask.
  #[serde(rename = "type", default)]
  pub kind: String,
  /// Arbitrary configuration such as `delay` or `subprocess`.
  #[serde(default)]
  pub details: HashMap<String, serde_json::Value>,
  /// Variables that must be supplied when this transition fires.
  #[serde(default)]
  pub variables: Vec<String>,
}
