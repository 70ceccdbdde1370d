//! # hivekeeper
//!
//! **hivekeeper** is the plugin-lifecycle and event-routing core of a rule-driven
//! home-automation hive.
//!
//! Independent plugins ("workers") each run an autonomous loop that produces domain
//! events ("a sensor fired") and execute domain actions ("turn on a light") on request.
//! An external rule system ("chains") decides, for each event, which actions to invoke.
//! This crate supervises the workers and routes their events to that rule system.
//!
//! ## Architecture
//! ```text
//!   WorkerDescriptor   WorkerDescriptor   WorkerDescriptor
//!          │                  │                  │
//!          ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor (control path)                                    │
//! │  - Registry (name → worker, class → factory)                  │
//! │  - LifecycleTracker (state + attempt counters per worker)     │
//! │  - Bus + Dispatcher (opened on start, closed on stop_all)     │
//! │  - Chains (active rule configuration)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//!  │ WorkerActor │   │ WorkerActor │   │ WorkerActor │   (≤ max_fatals attempts,
//!  │  Worker::run│   │  Worker::run│   │  Worker::run│    immediate retry)
//!  └──────┬──────┘   └──────┬──────┘   └──────┬──────┘
//!         │ publish(Event)  │                 │
//!         ▼                 ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Bus (bounded mpsc)                         │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                ▼
//!                         ┌────────────┐
//!                         │ Dispatcher │  log_event(), log
//!                         └─────┬──────┘
//!                ┌──────────────┼──────────────┐
//!                ▼              ▼              ▼
//!          tokio task     tokio task     tokio task      (one per event,
//!      ChainExecutor::execute(chains, event)              failures caught)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Workers**       | Plugin contract with a composable bookkeeping base.          | [`Worker`], [`WorkerBase`]                  |
//! | **Factories**     | Build workers of one class from descriptors.                 | [`Factory`], [`FactoryFn`], [`WorkerDescriptor`] |
//! | **Supervision**   | Start/stop/restart with bounded crash recovery.              | [`Supervisor`], [`WorkerStatus`]            |
//! | **Events**        | Shared intake bus and domain messages.                       | [`Bus`], [`Event`], [`Action`]              |
//! | **Chains**        | Boundary to the external rule engine.                        | [`ChainExecutor`], [`Chain`]                |
//! | **Errors**        | Typed errors for configuration, workers and chains.          | [`RuntimeError`], [`WorkerError`]           |
//! | **Configuration** | Centralize runtime settings.                                 | [`Config`]                                  |
//!
//! ## Logging
//! All runtime diagnostics go through [`tracing`]; install any subscriber to see them.

mod chains;
mod core;
mod error;
mod events;
mod workers;

// ---- Public re-exports ----

pub use chains::{Chain, ChainExecutor, Chains, EventSelector, NoopExecutor};
pub use core::{Config, Supervisor, SupervisorBuilder, WorkerState, WorkerStatus};
pub use error::{ActionError, BusClosed, ChainError, RuntimeError, WorkerError};
pub use events::{placeholder_value, Action, Bus, BusReceiver, Event, Filter, Placeholder};
pub use workers::{
    ActionDescriptor, CompletionHandle, EventDescriptor, Factory, FactoryFn, FactoryRef, Worker,
    WorkerBase, WorkerDescriptor, WorkerOption, WorkerOptions, WorkerRef,
};
