use std::path::Path;

use petriflow_config::ProcessDef;
use petriflow_net::Process;

use crate::compiler::compile;
use crate::error::ResolveError;

/// Parse and compile a YAML process definition.
pub fn load_yaml(text: &str) -> Result<Process, ResolveError> {
  let def: ProcessDef = serde_yaml::from_str(text)?;
  compile(def)
}

/// Parse and compile a JSON process definition.
pub fn load_json(text: &str) -> Result<Process, ResolveError> {
  let def: ProcessDef = serde_json::from_str(text)?;
  compile(def)
}

/// Load a definition file, choosing the format by extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load_file(path: impl AsRef<Path>) -> Result<Process, ResolveError> {
  let path = path.as_ref();
  let extension = path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase());

  let parse: fn(&str) -> Result<Process, ResolveError> = match extension.as_deref() {
    Some("yaml" | "yml") => load_yaml,
    Some("json") => load_json,
    _ => {
      return Err(ResolveError::UnsupportedFormat {
        path: path.to_path_buf(),
      });
    }
  };

  let text = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
    path: path.to_path_buf(),
    source,
  })?;

  parse(&text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_json() {
    let json = r#"{
      "title": "tiny",
      "places": [{ "id": "a", "tokens": 1 }, { "id": "b" }],
      "transitions": [{ "id": "t", "type": "user" }],
      "arcs": [
        { "sourceId": "a", "destinationId": "t", "type": "pt" },
        { "sourceId": "t", "destinationId": "b", "type": "tp", "weight": 2 }
      ]
    }"#;

    let process = load_json(json).unwrap();
    assert_eq!(process.initial_state(), &[1, 0]);
    assert_eq!(process.output_weights(0), &[0, 2]);
  }

  #[test]
  fn test_bad_direction_is_a_parse_error() {
    let json = r#"{
      "title": "bad",
      "places": [{ "id": "a" }],
      "transitions": [{ "id": "t" }],
      "arcs": [{ "sourceId": "a", "destinationId": "t", "type": "sideways" }]
    }"#;

    assert!(matches!(load_json(json).unwrap_err(), ResolveError::Json(_)));
  }

  #[test]
  fn test_unsupported_extension() {
    let err = load_file("process.toml").unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedFormat { .. }));
  }
}
