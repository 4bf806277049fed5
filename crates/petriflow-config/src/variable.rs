use serde::{Deserialize, Serialize};

/// A declared process variable.
///
/// Only declared variables are ever stored on a flow; anything else in
/// incoming data is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDef {
  pub id: String,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub var_type: Option<String>,
}
