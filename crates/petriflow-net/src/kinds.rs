use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
  /// How a transition is driven once it is enabled.
  ///
  /// A transition may carry several kinds. The dispatcher checks them in a
  /// fixed order: AUTO, MESSAGE, then per token TIMED, SYSTEM, SUBPROCESS.
  /// USER is never acted on automatically.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
  #[serde(transparent)]
  pub struct TransitionKinds: u8 {
    /// Fires immediately.
    const AUTO = 1 << 0;
    /// Waits for a caller to fire it.
    const USER = 1 << 1;
    /// Sends a message through the message hook, then fires.
    const MESSAGE = 1 << 2;
    /// Fires per token after a delay.
    const TIMED = 1 << 3;
    /// Spawns a child flow per token and fires when it completes.
    const SUBPROCESS = 1 << 4;
    /// Hands each token to the system-task hook; completed externally.
    const SYSTEM = 1 << 5;
  }
}

impl TransitionKinds {
  /// Whether the dispatcher fires this transition without waiting on a token.
  pub fn is_self_firing(self) -> bool {
    self.intersects(Self::AUTO | Self::MESSAGE)
  }

  /// Whether the dispatcher tracks this transition per token.
  pub fn is_per_token(self) -> bool {
    self.intersects(Self::TIMED | Self::SYSTEM | Self::SUBPROCESS)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_combined_kinds() {
    let kinds = TransitionKinds::USER | TransitionKinds::SYSTEM;

    assert!(kinds.contains(TransitionKinds::USER));
    assert!(kinds.is_per_token());
    assert!(!kinds.is_self_firing());
  }

  #[test]
  fn test_default_is_empty() {
    let kinds = TransitionKinds::default();

    assert!(kinds.is_empty());
    assert!(!kinds.is_self_firing());
    assert!(!kinds.is_per_token());
  }
}
