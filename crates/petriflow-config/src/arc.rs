use serde::{Deserialize, Serialize};

/// Direction of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
  /// Place to transition (an input arc).
  #[serde(rename = "pt")]
  PlaceToTransition,
  /// Transition to place (an output arc).
  #[serde(rename = "tp")]
  TransitionToPlace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDef {
  #[serde(rename = "sourceId")]
  pub source: String,
  #[serde(rename = "destinationId")]
  pub destination: String,
  #[serde(rename = "type")]
  pub direction: ArcDirection,
  /// Arc weight; anything below 1 is treated as 1.
  #[serde(default)]
  pub weight: u32,
  /// Boolean expression guarding an input arc.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<String>,
}
