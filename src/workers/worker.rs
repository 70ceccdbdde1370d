//! # Worker capability contract.
//!
//! A [`Worker`] is a plugin instance with an autonomous run-loop that publishes
//! [`Event`]s and a handler that executes [`Action`]s on request.
//!
//! Implementors provide three things: [`base`](Worker::base) (the embedded
//! [`WorkerBase`]), [`run`](Worker::run) and [`handle_action`](Worker::handle_action).
//! Every other operation has a default that delegates to the base.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use hivekeeper::{Action, Bus, Event, Placeholder, Worker, WorkerBase, WorkerError, WorkerOptions};
//!
//! struct Ticker {
//!     base: WorkerBase,
//! }
//!
//! #[async_trait]
//! impl Worker for Ticker {
//!     fn base(&self) -> &WorkerBase { &self.base }
//!
//!     async fn run(&self, ctx: CancellationToken, events: Bus) -> Result<(), WorkerError> {
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return Ok(()),
//!                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
//!                     events.publish(Event::new(self.name(), "tick")).await?;
//!                 }
//!             }
//!         }
//!     }
//!
//!     async fn handle_action(&self, _action: &Action) -> Result<Vec<Placeholder>, WorkerError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let t = Ticker { base: WorkerBase::new("tick", "ticker", "", WorkerOptions::new()) };
//! assert_eq!(t.namespace(), "ticker");
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::base::WorkerBase;
use super::completion::CompletionHandle;
use super::options::WorkerOptions;
use crate::error::WorkerError;
use crate::events::{Action, Bus, Placeholder};

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// # Plugin instance driven by the supervisor.
///
/// All methods take `&self`; the worker is shared between its supervision task,
/// the dispatcher and action callers. [`stop`](Worker::stop) may be called
/// concurrently with [`run`](Worker::run).
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Embedded bookkeeping state.
    fn base(&self) -> &WorkerBase;

    /// Runs until `ctx` is cancelled, publishing events into `events`.
    ///
    /// `ctx` is the worker's current stop signal. Returning `Ok(())` ends supervision;
    /// returning `Err` (or panicking) counts as a crash and may trigger a retry.
    async fn run(&self, ctx: CancellationToken, events: Bus) -> Result<(), WorkerError>;

    /// Executes one action and returns its result values.
    async fn handle_action(&self, action: &Action) -> Result<Vec<Placeholder>, WorkerError>;

    /// Unique identifier (registry key).
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Factory class this worker was built by.
    fn namespace(&self) -> &str {
        self.base().namespace()
    }

    fn description(&self) -> String {
        self.base().description()
    }

    fn set_description(&self, description: String) {
        self.base().set_description(description);
    }

    fn options(&self) -> WorkerOptions {
        self.base().options()
    }

    fn set_options(&self, options: WorkerOptions) {
        self.base().set_options(options);
    }

    fn is_running(&self) -> bool {
        self.base().is_running()
    }

    /// Marks the worker as running. Called by the supervisor before spawning `run`.
    fn start(&self) {
        self.base().start();
    }

    /// Fires the stop signal and marks the worker as not running.
    fn stop(&self) {
        self.base().stop();
    }

    fn last_event(&self) -> Option<SystemTime> {
        self.base().last_event()
    }

    fn log_event(&self) {
        self.base().log_event();
    }

    fn last_action(&self) -> Option<SystemTime> {
        self.base().last_action()
    }

    fn log_action(&self) {
        self.base().log_action();
    }

    fn stop_signal(&self) -> CancellationToken {
        self.base().stop_signal()
    }

    fn set_stop_signal(&self, token: CancellationToken) {
        self.base().set_stop_signal(token);
    }

    fn completion(&self) -> CompletionHandle {
        self.base().completion()
    }

    fn set_completion(&self, handle: CompletionHandle) {
        self.base().set_completion(handle);
    }
}

impl std::fmt::Debug for dyn Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").field("base", self.base()).finish()
    }
}
