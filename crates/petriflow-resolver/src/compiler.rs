use std::collections::HashMap;

use petriflow_config::{ArcDirection, ProcessDef, TransitionDef};
use petriflow_net::{Process, Transition, TransitionKinds};
use tracing::debug;

use crate::error::ResolveError;

/// Type keywords and the kind each one selects.
const KEYWORDS: &[(&str, TransitionKinds)] = &[
  ("auto", TransitionKinds::AUTO),
  ("form", TransitionKinds::USER),
  ("user", TransitionKinds::USER),
  ("message", TransitionKinds::MESSAGE),
  ("timed", TransitionKinds::TIMED),
  ("subprocess", TransitionKinds::SUBPROCESS),
  ("system", TransitionKinds::SYSTEM),
  ("call", TransitionKinds::SYSTEM),
  ("ai", TransitionKinds::SYSTEM),
  ("api", TransitionKinds::SYSTEM),
];

/// Derive a kind bitmask from free-form type keywords.
///
/// Matching is a case-insensitive substring test, so `"User Form"` and
/// `"timed,system"` both work. Note that substrings count: `"email"`
/// contains `"ai"` and therefore selects SYSTEM.
pub fn kinds_from_keywords(keywords: &str) -> TransitionKinds {
  let lowered = keywords.to_lowercase();
  KEYWORDS
    .iter()
    .filter(|(keyword, _)| lowered.contains(keyword))
    .fold(TransitionKinds::empty(), |acc, (_, kind)| acc | *kind)
}

/// Compile a process definition into an executable [`Process`].
///
/// Places keep their declaration order and give the initial marking.
/// Arcs of direction `pt` fill the input matrix and contribute their
/// condition to the destination transition; `tp` arcs fill the output
/// matrix. Weights below 1 become 1.
pub fn compile(def: ProcessDef) -> Result<Process, ResolveError> {
  let mut places: HashMap<&str, usize> = HashMap::new();
  for (index, place) in def.places.iter().enumerate() {
    if places.insert(place.id.as_str(), index).is_some() {
      return Err(ResolveError::DuplicatePlace {
        place_id: place.id.clone(),
      });
    }
  }

  let mut transitions: HashMap<&str, usize> = HashMap::new();
  for (index, transition) in def.transitions.iter().enumerate() {
    if transitions.insert(transition.id.as_str(), index).is_some() {
      return Err(ResolveError::DuplicateTransition {
        transition_id: transition.id.clone(),
      });
    }
  }

  let place_count = def.places.len();
  let transition_count = def.transitions.len();
  let mut input_matrix = vec![vec![0u32; place_count]; transition_count];
  let mut output_matrix = vec![vec![0u32; place_count]; transition_count];
  let mut condition_matrix: Vec<Vec<String>> = vec![Vec::new(); transition_count];

  for arc in &def.arcs {
    let weight = arc.weight.max(1);
    match arc.direction {
      ArcDirection::PlaceToTransition => {
        let p = lookup_place(&places, &arc.source)?;
        let t = lookup_transition(&transitions, &arc.destination)?;
        input_matrix[t][p] = weight;
        if let Some(condition) = arc.condition.as_deref().filter(|c| !c.trim().is_empty()) {
          condition_matrix[t].push(condition.to_string());
        }
      }
      ArcDirection::TransitionToPlace => {
        let t = lookup_transition(&transitions, &arc.source)?;
        let p = lookup_place(&places, &arc.destination)?;
        output_matrix[t][p] = weight;
      }
    }
  }

  let kinds = def
    .transitions
    .iter()
    .map(|t| kinds_from_keywords(&t.kind))
    .collect();

  debug!(
    process = %def.title,
    places = place_count,
    transitions = transition_count,
    arcs = def.arcs.len(),
    "process compiled"
  );

  let initial_state = def.places.iter().map(|p| p.tokens).collect();
  let variables: Vec<String> = def.variables.into_iter().map(|v| v.id).collect();
  let transitions = def.transitions.into_iter().map(to_transition).collect();

  let process = Process::builder(def.title)
    .input_matrix(input_matrix)
    .output_matrix(output_matrix)
    .conditions(condition_matrix)
    .kinds(kinds)
    .initial_state(initial_state)
    .transitions(transitions)
    .variables(variables)
    .start_variables(def.start_variables)
    .build()?;

  Ok(process)
}

fn to_transition(def: TransitionDef) -> Transition {
  Transition {
    id: def.id,
    kind: def.kind,
    details: def.details,
    required_variables: def.variables,
  }
}

fn lookup_place(places: &HashMap<&str, usize>, id: &str) -> Result<usize, ResolveError> {
  places
    .get(id)
    .copied()
    .ok_or_else(|| ResolveError::UnknownPlace {
      place_id: id.to_string(),
    })
}

fn lookup_transition(transitions: &HashMap<&str, usize>, id: &str) -> Result<usize, ResolveError> {
  transitions
    .get(id)
    .copied()
    .ok_or_else(|| ResolveError::UnknownTransition {
      transition_id: id.to_string(),
    })
}
