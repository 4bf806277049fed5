//! Petriflow Engine
//!
//! This crate runs flows: live instances of a compiled
//! [`Process`](petriflow_net::Process) that carry tokens through the net.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - EngineConfig + Handlers (hooks, loaders)                 │
//! │  - create_flow(process, owner) → FlowHandle                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  FlowHandle (Arc<Mutex<Flow>>)              │
//! │  - start(data), fire(t, data), fire_system_task(token, data)│
//! │  - every call holds the flow lock for the whole pass        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Dispatcher                           │
//! │  - fires AUTO / MESSAGE transitions to a fixed point        │
//! │  - registers tokens for TIMED / SYSTEM / SUBPROCESS         │
//! │  - completion check, subprocess join                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timers and subprocess joins run as tokio tasks. They re-acquire the flow
//! lock, fire the transition for their specific token and dispatch again.
//!
//! # Usage
//!
//! ```ignore
//! use petriflow_engine::{Engine, EngineConfig, FlowRegistry, Handlers};
//!
//! let registry = FlowRegistry::new();
//! let handlers = Handlers::new()
//!   .with_registry(&registry)
//!   .on_process_completed(|flow| println!("{} done", flow.id()));
//!
//! let engine = Engine::new(EngineConfig::default(), handlers)?;
//! let flow = engine.create_flow(process, "owner");
//! let enabled = flow.start(Variables::new()).await?;
//! ```

mod config;
mod dispatch;
mod engine;
mod error;
mod flow;
mod gate;
mod hooks;
mod registry;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::FlowError;
pub use flow::{Flow, FlowHandle, FlowId, FlowSnapshot, ParentLink};
pub use gate::{merge_declared, missing_required, parse_delay};
pub use hooks::{
  FlowCreatedHook, FlowHook, FlowLoader, Handlers, LoaderError, MessageHook, ProcessLoader,
  SystemTaskHook, TokenHook, TransitionHook,
};
pub use registry::FlowRegistry;
