//! Petriflow Net
//!
//! This crate provides the immutable process model and the marking that a
//! running flow carries through it.
//!
//! A [`Process`] is a compiled Petri net: weighted input and output matrices
//! indexed `[transition][place]`, per-transition guard conditions, a
//! [`TransitionKinds`] bitmask per transition and the initial marking.
//! It is shared read-only between every flow created from it.
//!
//! A [`Net`] is the mutable side: a [`TokenLedger`] holding the identities
//! of the tokens in every place, and the set of currently enabled
//! transitions. Firing always recomputes enabling over the whole net because
//! guard conditions read flow variables that may change independently.

mod condition;
mod error;
mod kinds;
mod ledger;
mod net;
mod process;
mod value;

pub use condition::{evaluate_condition, evaluate_conditions};
pub use error::NetError;
pub use kinds::TransitionKinds;
pub use ledger::{TokenId, TokenLedger};
pub use net::Net;
pub use process::{Process, ProcessBuilder, Transition};
pub use value::{Value, Variables, variables_from_json};
