//! Runtime core: supervision, registry and event dispatch.
//!
//! The public API from this module is [`Supervisor`] (plus its builder, config and
//! status types). Internal modules:
//! - [`registry`]: name → worker and class → factory maps;
//! - [`supervisor`]: control path for instantiate/start/stop/restart/delete;
//! - [`actor`]: supervises one worker's run-loop with bounded crash recovery;
//! - [`runner`]: executes one run-loop attempt, turning panics into errors;
//! - [`dispatcher`]: drains the bus and hands events to the chain executor;
//! - [`lifecycle`]: per-worker state machine and attempt counters;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod builder;
mod config;
mod dispatcher;
mod lifecycle;
mod registry;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use lifecycle::{WorkerState, WorkerStatus};
pub use supervisor::Supervisor;
