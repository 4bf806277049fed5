use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::NetError;
use crate::kinds::TransitionKinds;

/// Descriptive data for a single transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
  pub id: String,
  /// The type keywords the transition was authored with.
  #[serde(default)]
  pub kind: String,
  /// Arbitrary configuration, e.g. `delay` or `subprocess`.
  #[serde(default)]
  pub details: HashMap<String, serde_json::Value>,
  /// Variables that must be present in the data supplied on fire.
  #[serde(default)]
  pub required_variables: Vec<String>,
}

impl Transition {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      ..Default::default()
    }
  }

  pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.details.insert(key.into(), value);
    self
  }

  pub fn with_required(mut self, variables: &[&str]) -> Self {
    self.required_variables = variables.iter().map(|v| v.to_string()).collect();
    self
  }

  pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
    self.details.get(key)
  }
}

/// An immutable, compiled Petri net.
///
/// Matrices are indexed `[transition][place]`. Build one with
/// [`Process::builder`]; the builder checks that every dimension agrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
  name: String,
  transitions: Vec<Transition>,
  input_matrix: Vec<Vec<u32>>,
  output_matrix: Vec<Vec<u32>>,
  condition_matrix: Vec<Vec<String>>,
  transition_kinds: Vec<TransitionKinds>,
  initial_state: Vec<u32>,
  variables: Vec<String>,
  start_variables: Vec<String>,
}

impl Process {
  pub fn builder(name: impl Into<String>) -> ProcessBuilder {
    ProcessBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Number of places.
  pub fn places(&self) -> usize {
    self.initial_state.len()
  }

  /// Number of transitions.
  pub fn transition_count(&self) -> usize {
    self.transitions.len()
  }

  pub fn transitions(&self) -> &[Transition] {
    &self.transitions
  }

  pub fn transition(&self, index: usize) -> Option<&Transition> {
    self.transitions.get(index)
  }

  /// Index of the transition with the given id.
  pub fn transition_index(&self, id: &str) -> Option<usize> {
    self.transitions.iter().position(|t| t.id == id)
  }

  pub fn input_weights(&self, transition: usize) -> &[u32] {
    self
      .input_matrix
      .get(transition)
      .map(|row| row.as_slice())
      .unwrap_or(&[])
  }

  pub fn output_weights(&self, transition: usize) -> &[u32] {
    self
      .output_matrix
      .get(transition)
      .map(|row| row.as_slice())
      .unwrap_or(&[])
  }

  /// Input places of a transition with their positive weights.
  pub fn input_places(&self, transition: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
    positive(self.input_weights(transition))
  }

  /// Output places of a transition with their positive weights.
  pub fn output_places(&self, transition: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
    positive(self.output_weights(transition))
  }

  pub fn conditions(&self, transition: usize) -> &[String] {
    self
      .condition_matrix
      .get(transition)
      .map(|row| row.as_slice())
      .unwrap_or(&[])
  }

  pub fn kinds(&self, transition: usize) -> TransitionKinds {
    self
      .transition_kinds
      .get(transition)
      .copied()
      .unwrap_or_default()
  }

  pub fn initial_state(&self) -> &[u32] {
    &self.initial_state
  }

  /// Declared variable identifiers.
  pub fn variables(&self) -> &[String] {
    &self.variables
  }

  pub fn is_declared(&self, variable: &str) -> bool {
    self.variables.iter().any(|v| v == variable)
  }

  pub fn start_variables(&self) -> &[String] {
    &self.start_variables
  }
}

fn positive(weights: &[u32]) -> impl Iterator<Item = (usize, u32)> + '_ {
  weights
    .iter()
    .copied()
    .enumerate()
    .filter(|(_, w)| *w > 0)
}

/// Builder for [`Process`].
///
/// Only the input matrix, output matrix and initial state are mandatory.
/// Missing transition descriptions default to `t{index}`, missing kinds to
/// an empty bitmask and missing conditions to none.
#[derive(Debug, Clone, Default)]
pub struct ProcessBuilder {
  name: String,
  transitions: Option<Vec<Transition>>,
  input_matrix: Vec<Vec<u32>>,
  output_matrix: Vec<Vec<u32>>,
  condition_matrix: Option<Vec<Vec<String>>>,
  transition_kinds: Option<Vec<TransitionKinds>>,
  initial_state: Vec<u32>,
  variables: Vec<String>,
  start_variables: Vec<String>,
}

impl ProcessBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn input_matrix(mut self, matrix: Vec<Vec<u32>>) -> Self {
    self.input_matrix = matrix;
    self
  }

  pub fn output_matrix(mut self, matrix: Vec<Vec<u32>>) -> Self {
    self.output_matrix = matrix;
    self
  }

  pub fn initial_state(mut self, state: Vec<u32>) -> Self {
    self.initial_state = state;
    self
  }

  pub fn transitions(mut self, transitions: Vec<Transition>) -> Self {
    self.transitions = Some(transitions);
    self
  }

  pub fn kinds(mut self, kinds: Vec<TransitionKinds>) -> Self {
    self.transition_kinds = Some(kinds);
    self
  }

  pub fn conditions(mut self, conditions: Vec<Vec<String>>) -> Self {
    self.condition_matrix = Some(conditions);
    self
  }

  pub fn variables<S: Into<String>>(mut self, variables: impl IntoIterator<Item = S>) -> Self {
    self.variables = variables.into_iter().map(Into::into).collect();
    self
  }

  pub fn start_variables<S: Into<String>>(
    mut self,
    variables: impl IntoIterator<Item = S>,
  ) -> Self {
    self.start_variables = variables.into_iter().map(Into::into).collect();
    self
  }

  pub fn build(self) -> Result<Process, NetError> {
    let transition_count = self.input_matrix.len();
    let places = self.initial_state.len();

    check_len("output matrix rows", transition_count, self.output_matrix.len())?;
    for (t, row) in self.input_matrix.iter().enumerate() {
      check_len(&format!("input matrix row {}", t), places, row.len())?;
    }
    for (t, row) in self.output_matrix.iter().enumerate() {
      check_len(&format!("output matrix row {}", t), places, row.len())?;
    }

    let transitions = match self.transitions {
      Some(transitions) => {
        check_len("transitions", transition_count, transitions.len())?;
        transitions
      }
      None => (0..transition_count)
        .map(|t| Transition::new(format!("t{}", t)))
        .collect(),
    };

    let transition_kinds = match self.transition_kinds {
      Some(kinds) => {
        check_len("transition kinds", transition_count, kinds.len())?;
        kinds
      }
      None => vec![TransitionKinds::empty(); transition_count],
    };

    let condition_matrix = match self.condition_matrix {
      Some(conditions) => {
        check_len("condition matrix rows", transition_count, conditions.len())?;
        conditions
      }
      None => vec![Vec::new(); transition_count],
    };

    Ok(Process {
      name: self.name,
      transitions,
      input_matrix: self.input_matrix,
      output_matrix: self.output_matrix,
      condition_matrix,
      transition_kinds,
      initial_state: self.initial_state,
      variables: self.variables,
      start_variables: self.start_variables,
    })
  }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), NetError> {
  if expected == actual {
    Ok(())
  } else {
    Err(NetError::DimensionMismatch {
      what: what.to_string(),
      expected,
      actual,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn two_step() -> ProcessBuilder {
    Process::builder("two-step")
      .input_matrix(vec![vec![1, 0, 0], vec![0, 2, 0]])
      .output_matrix(vec![vec![0, 2, 0], vec![0, 0, 1]])
      .initial_state(vec![1, 0, 0])
  }

  #[test]
  fn test_build_defaults() {
    let process = two_step().build().unwrap();

    assert_eq!(process.places(), 3);
    assert_eq!(process.transition_count(), 2);
    assert_eq!(process.transition(1).unwrap().id, "t1");
    assert!(process.kinds(0).is_empty());
    assert!(process.conditions(1).is_empty());
  }

  #[test]
  fn test_input_and_output_places() {
    let process = two_step().build().unwrap();

    assert_eq!(process.input_places(1).collect::<Vec<_>>(), vec![(1, 2)]);
    assert_eq!(process.output_places(0).collect::<Vec<_>>(), vec![(1, 2)]);
  }

  #[test]
  fn test_row_width_mismatch() {
    let err = Process::builder("bad")
      .input_matrix(vec![vec![1, 0]])
      .output_matrix(vec![vec![0, 1, 0]])
      .initial_state(vec![1, 0, 0])
      .build()
      .unwrap_err();

    assert_eq!(
      err,
      NetError::DimensionMismatch {
        what: "input matrix row 0".to_string(),
        expected: 3,
        actual: 2,
      }
    );
  }

  #[test]
  fn test_kinds_length_mismatch() {
    let err = two_step()
      .kinds(vec![TransitionKinds::AUTO])
      .build()
      .unwrap_err();

    assert!(matches!(err, NetError::DimensionMismatch { expected: 2, actual: 1, .. }));
  }

  #[test]
  fn test_transition_lookup() {
    let process = two_step()
      .transitions(vec![
        Transition::new("submit").with_required(&["message"]),
        Transition::new("approve"),
      ])
      .variables(["message"])
      .build()
      .unwrap();

    assert_eq!(process.transition_index("approve"), Some(1));
    assert_eq!(process.transition(0).unwrap().required_variables, vec!["message"]);
    assert!(process.is_declared("message"));
    assert!(!process.is_declared("other"));
  }
}
