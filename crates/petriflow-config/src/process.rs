use serde::{Deserialize, Serialize};

use crate::arc::ArcDef;
use crate::place::PlaceDef;
use crate::transition::TransitionDef;
use crate::variable::VariableDef;

/// A complete process definition as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDef {
  pub title: String,
  #[serde(default)]
  pub places: Vec<PlaceDef>,
  #[serde(default)]
  pub transitions: Vec<TransitionDef>,
  #[serde(default)]
  pub arcs: Vec<ArcDef>,
  #[serde(default)]
  pub variables: Vec<VariableDef>,
  /// Variables that must be supplied before a flow may start.
  #[serde(default, rename = "startvariables")]
  pub start_variables: Vec<String>,
}
