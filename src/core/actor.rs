//! # WorkerActor: single-worker supervision.
//!
//! Supervises the run-loop of one [`Worker`] with bounded, immediate crash recovery.
//!
//! ## Architecture
//! ```text
//! Supervisor::start_one ──► worker.start() ──► tokio::spawn(WorkerActor::run())
//!
//! loop {
//!   ├─► lifecycle.attempt()
//!   ├─► run_once(worker) ──► worker.run(stop_signal, bus)
//!   │       │
//!   │       ├─ Ok  ──► exit Completed
//!   │       │
//!   │       └─ Err / panic ──► warn!(fatals)
//!   │                          ├─ stop signal fired   ─► exit Stopped
//!   │                          ├─ fatals >= max_fatals ─► error!("evil"), exit Abandoned
//!   │                          └─ otherwise           ─► lifecycle.retrying(), continue
//!   │                                                    (no backoff)
//! }
//!
//! On exit: worker.stop() (clears running flag), completion.mark_done()
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** within one actor (never parallel)
//! - At most `max_fatals` attempts; never one more
//! - The completion handle is marked done **once**, when supervision ends
//! - An abandoned worker stays registered but is no longer running

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::core::lifecycle::{LifecycleTracker, WorkerState};
use crate::core::runner::run_once;
use crate::events::Bus;
use crate::workers::WorkerRef;

/// Why a supervision ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorExit {
    /// `run` returned normally.
    Completed { attempts: u32 },
    /// `run` failed after the stop signal fired; no retry.
    Stopped { attempts: u32 },
    /// Crash ceiling reached; the worker was abandoned.
    Abandoned { attempts: u32 },
}

/// Supervises one worker's run-loop.
pub struct WorkerActor {
    worker: WorkerRef,
    bus: Bus,
    lifecycle: Arc<LifecycleTracker>,
    max_fatals: u32,
    generation: u64,
}

impl WorkerActor {
    pub fn new(
        worker: WorkerRef,
        bus: Bus,
        lifecycle: Arc<LifecycleTracker>,
        max_fatals: u32,
        generation: u64,
    ) -> Self {
        Self {
            worker,
            bus,
            lifecycle,
            max_fatals: max_fatals.max(1),
            generation,
        }
    }

    /// Runs the actor until the worker returns, is stopped, or is abandoned.
    ///
    /// ### Exit conditions
    /// - `run` returns `Ok(())` → [`ActorExit::Completed`]
    /// - `run` fails while the stop signal is set → [`ActorExit::Stopped`]
    /// - `run` fails for the `max_fatals`-th time → [`ActorExit::Abandoned`]
    pub async fn run(self) -> ActorExit {
        let name = self.worker.name().to_string();
        let completion = self.worker.completion();
        let mut fatals: u32 = 0;

        let exit = loop {
            self.lifecycle.attempt(&name, self.generation).await;

            let err = match run_once(self.worker.as_ref(), &self.bus).await {
                Ok(()) => break ActorExit::Completed { attempts: fatals + 1 },
                Err(e) => e,
            };

            warn!(worker = %name, error = %err, label = err.as_label(), fatals, "worker run-loop failed");
            fatals += 1;

            if self.worker.stop_signal().is_cancelled() {
                break ActorExit::Stopped { attempts: fatals };
            }
            if fatals >= self.max_fatals {
                error!(worker = %name, fatals, "terminating evil worker after repeated failures");
                break ActorExit::Abandoned { attempts: fatals };
            }
            self.lifecycle.retrying(&name, self.generation).await;
        };

        self.worker.stop();
        let state = match exit {
            ActorExit::Abandoned { .. } => WorkerState::Abandoned,
            _ => WorkerState::Stopped,
        };
        self.lifecycle
            .finished(&name, self.generation, state)
            .await;
        completion.mark_done();

        info!(worker = %name, ?exit, "worker supervision ended");
        exit
    }
}
