use std::time::Duration;

/// Configuration for the flow engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Delay used for timed transitions whose `delay` detail is missing,
  /// zero or unparseable.
  pub min_timer_delay: Duration,
  /// Upper bound on AUTO/MESSAGE fires within a single dispatch pass.
  ///
  /// This is a hard ceiling, not cycle detection: an acyclic net whose
  /// self-firing transitions need more fires than this in one pass (for
  /// example more tokens than the limit feeding an AUTO transition) also
  /// fails with `FlowError::AutoFireLimit`. Raise it for such nets.
  pub max_auto_fires: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      min_timer_delay: Duration::from_millis(100),
      max_auto_fires: 10_000,
    }
  }
}
