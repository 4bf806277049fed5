//! Validation and merging of externally supplied data.

use std::time::Duration;

use petriflow_net::{Process, Variables};

/// Required fields absent from `data`, in the order they are required.
///
/// A key counts as present whatever its value, including null.
pub fn missing_required(required: &[String], data: &Variables) -> Vec<String> {
  required
    .iter()
    .filter(|field| !data.contains_key(field.as_str()))
    .cloned()
    .collect()
}

/// Copy the entries of `data` that the process declares into `variables`.
/// Undeclared keys are dropped.
pub fn merge_declared(process: &Process, variables: &mut Variables, data: Variables) {
  for (key, value) in data {
    if process.is_declared(&key) {
      variables.insert(key, value);
    }
  }
}

/// Read a timer delay in fractional seconds.
///
/// Numbers and numeric strings are accepted. Anything missing, zero,
/// negative or unparseable yields `fallback`.
pub fn parse_delay(value: Option<&serde_json::Value>, fallback: Duration) -> Duration {
  let seconds = match value {
    Some(serde_json::Value::Number(n)) => n.as_f64(),
    Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
    _ => None,
  };

  seconds
    .filter(|s| *s > 0.0)
    .and_then(|s| Duration::try_from_secs_f64(s).ok())
    .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
  use super::*;
  use petriflow_net::Value;
  use serde_json::json;

  const FALLBACK: Duration = Duration::from_millis(100);

  #[test]
  fn test_missing_required_preserves_order() {
    let required = vec!["b".to_string(), "a".to_string(), "c".to_string()];
    let mut data = Variables::new();
    data.insert("a".to_string(), Value::Int(1));

    assert_eq!(missing_required(&required, &data), vec!["b", "c"]);
  }

  #[test]
  fn test_null_counts_as_present() {
    let required = vec!["a".to_string()];
    let mut data = Variables::new();
    data.insert("a".to_string(), Value::Null);

    assert!(missing_required(&required, &data).is_empty());
  }

  #[test]
  fn test_merge_drops_undeclared() {
    let process = Process::builder("p")
      .input_matrix(vec![])
      .output_matrix(vec![])
      .initial_state(vec![])
      .variables(["counts"])
      .build()
      .unwrap();

    let mut variables = Variables::new();
    let mut data = Variables::new();
    data.insert("counts".to_string(), Value::Int(4));
    data.insert("secret".to_string(), Value::from("x"));
    merge_declared(&process, &mut variables, data);

    assert_eq!(variables.len(), 1);
    assert_eq!(variables["counts"], Value::Int(4));
  }

  #[test]
  fn test_parse_delay() {
    assert_eq!(parse_delay(Some(&json!(2)), FALLBACK), Duration::from_secs(2));
    assert_eq!(parse_delay(Some(&json!(0.01)), FALLBACK), Duration::from_millis(10));
    assert_eq!(parse_delay(Some(&json!("0.5")), FALLBACK), Duration::from_millis(500));
    assert_eq!(parse_delay(Some(&json!(" 1 ")), FALLBACK), Duration::from_secs(1));
  }

  #[test]
  fn test_parse_delay_fallback() {
    assert_eq!(parse_delay(None, FALLBACK), FALLBACK);
    assert_eq!(parse_delay(Some(&json!(0)), FALLBACK), FALLBACK);
    assert_eq!(parse_delay(Some(&json!(-3)), FALLBACK), FALLBACK);
    assert_eq!(parse_delay(Some(&json!("soon")), FALLBACK), FALLBACK);
    assert_eq!(parse_delay(Some(&json!(true)), FALLBACK), FALLBACK);
  }
}
