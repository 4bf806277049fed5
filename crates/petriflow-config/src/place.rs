use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDef {
  pub id: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub label: String,
  /// Initial token count.
  #[serde(default)]
  pub tokens: u32,
}
