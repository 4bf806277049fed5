//! Guard condition evaluation using minijinja expressions.
//!
//! Conditions are attached to a transition's input arcs and are plain
//! minijinja expressions over the flow variables:
//!
//! ```text
//! counts < 10
//! message == "approved" and urgent
//! ```
//!
//! A condition that looks up a variable the flow does not have is false,
//! whatever the rest of the expression says. Builtin globals such as
//! `range` are not variables and resolve as usual. Every evaluation error,
//! including a syntax error, also makes the condition false.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use minijinja::value::{Object, Value as JinjaValue};
use minijinja::{Environment, UndefinedBehavior};
use tracing::debug;

use crate::value::Variables;

fn environment() -> &'static Environment<'static> {
  static ENV: OnceLock<Environment<'static>> = OnceLock::new();
  ENV.get_or_init(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
  })
}

/// Expression context that remembers whether a lookup missed.
#[derive(Debug)]
struct Scope {
  variables: BTreeMap<String, JinjaValue>,
  missed: AtomicBool,
}

impl Object for Scope {
  fn get_value(self: &Arc<Self>, key: &JinjaValue) -> Option<JinjaValue> {
    let name = key.as_str()?;
    let found = self.variables.get(name).cloned();
    if found.is_none() && !is_global(name) {
      self.missed.store(true, Ordering::Relaxed);
    }
    found
  }
}

/// Whether `name` resolves without any variables, as the builtin
/// functions (`range`, `namespace`, ...) do.
fn is_global(name: &str) -> bool {
  environment()
    .compile_expression(name)
    .and_then(|expr| expr.eval(minijinja::context! {}))
    .is_ok_and(|value| !value.is_undefined())
}

/// Evaluate a single condition against the variables.
pub fn evaluate_condition(condition: &str, variables: &Variables) -> bool {
  let expr = match environment().compile_expression(condition) {
    Ok(expr) => expr,
    Err(e) => {
      debug!(condition, error = %e, "condition failed to compile");
      return false;
    }
  };

  let scope = Arc::new(Scope {
    variables: variables
      .iter()
      .map(|(k, v)| (k.clone(), JinjaValue::from_serialize(v)))
      .collect(),
    missed: AtomicBool::new(false),
  });

  match expr.eval(JinjaValue::from_dyn_object(scope.clone())) {
    Ok(_) if scope.missed.load(Ordering::Relaxed) => {
      debug!(condition, "condition references an undefined variable");
      false
    }
    Ok(value) => value.is_true(),
    Err(e) => {
      debug!(condition, error = %e, "condition evaluated to an error");
      false
    }
  }
}

/// Evaluate every condition; true when all hold (or there are none).
pub fn evaluate_conditions(conditions: &[String], variables: &Variables) -> bool {
  conditions
    .iter()
    .all(|condition| evaluate_condition(condition, variables))
}
