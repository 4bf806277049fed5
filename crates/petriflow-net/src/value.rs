//! Flow variable values.
//!
//! Variables are a tagged union rather than arbitrary JSON so guard
//! conditions and arithmetic only ever see scalars. Arrays and objects are
//! rejected where external data enters ([`variables_from_json`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// A flow's working data, keyed by variable identifier.
pub type Variables = BTreeMap<String, Value>;

/// A single variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Int(n) => Some(*n),
      _ => None,
    }
  }

  /// Numeric view of the value; integers widen to `f64`.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Int(n) => Some(*n as f64),
      Value::Float(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  /// Convert a JSON value, naming `key` in the error for non-scalars.
  pub fn from_json(key: &str, value: serde_json::Value) -> Result<Self, NetError> {
    match value {
      serde_json::Value::Null => Ok(Value::Null),
      serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Ok(Value::Int(i)),
        None => Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN))),
      },
      serde_json::Value::String(s) => Ok(Value::String(s)),
      serde_json::Value::Array(_) => Err(NetError::UnsupportedValue {
        key: key.to_string(),
        kind: "array",
      }),
      serde_json::Value::Object(_) => Err(NetError::UnsupportedValue {
        key: key.to_string(),
        kind: "object",
      }),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "null"),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Int(n) => write!(f, "{}", n),
      Value::Float(n) => write!(f, "{}", n),
      Value::String(s) => write!(f, "{}", s),
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Value::Int(n)
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self {
    Value::Int(n.into())
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Value::Float(n)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

/// Convert a JSON object into [`Variables`].
///
/// `null` converts to an empty set. Any other non-object, and any nested
/// array or object value, is rejected.
pub fn variables_from_json(value: serde_json::Value) -> Result<Variables, NetError> {
  match value {
    serde_json::Value::Null => Ok(Variables::new()),
    serde_json::Value::Object(map) => map
      .into_iter()
      .map(|(key, value)| {
        let value = Value::from_json(&key, value)?;
        Ok((key, value))
      })
      .collect(),
    other => Err(NetError::UnsupportedValue {
      key: String::new(),
      kind: json_kind(&other),
    }),
  }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "boolean",
    serde_json::Value::Number(_) => "number",
    serde_json::Value::String(_) => "string",
    serde_json::Value::Array(_) => "array",
    serde_json::Value::Object(_) => "object",
  }
}
