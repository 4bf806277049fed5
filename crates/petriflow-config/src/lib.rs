//! Petriflow Config
//!
//! This crate contains the serializable process definition types for petriflow.
//! These types describe a Petri net before it is compiled into the matrix form
//! the engine executes.
//!
//! Definitions can be loaded from:
//! - YAML files (the usual authoring format)
//! - JSON files or blobs
//!
//! `petriflow-resolver` takes a [`ProcessDef`], checks that every arc
//! references a known place and transition, and compiles it into a
//! `petriflow_net::Process`.

mod arc;
mod place;
mod process;
mod transition;
mod variable;

pub use arc::{ArcDef, ArcDirection};
pub use place::PlaceDef;
pub use process::ProcessDef;
pub use transition::TransitionDef;
pub use variable::VariableDef;
