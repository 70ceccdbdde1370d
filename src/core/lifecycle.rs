//! # Per-worker lifecycle tracker.
//!
//! Records the state machine position and attempt counters of every worker the
//! supervisor has touched.
//!
//! ## State machine
//! ```text
//! Created ─► Started ─► Running ─┬─► Retrying ─► Running ─► ...
//!                                ├─► Abandoned          (crash ceiling reached)
//!                                └─► Stopped ─┬─► Restarted ─► Started ─► ...
//!                                             └─► Deleted   (terminal)
//! ```
//!
//! ## Rules
//! - `attempts` counts run-loop invocations of the current supervision.
//! - `retries` counts re-invocations after a crash (`attempts - 1` while crashing).
//! - Both counters reset on restart.
//! - Updates from a superseded supervision (older generation) are ignored.
//! - Generations come from one tracker-wide counter, so they are never reused,
//!   not even for a name that was cleared and started again.
//! - Entries live until [`clear`](LifecycleTracker::clear), which `stop_all` calls.
//!   A deleted worker keeps its `Deleted` entry until then.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

/// Position of a worker in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Built by its factory and registered.
    Created,
    /// `start()` called; supervision about to spawn.
    Started,
    /// Run-loop active.
    Running,
    /// Run-loop crashed; next attempt is being launched.
    Retrying,
    /// Run-loop returned or was stopped.
    Stopped,
    /// Crash ceiling reached; still registered but inert.
    Abandoned,
    /// Stopped for a restart; a fresh supervision follows.
    Restarted,
    /// Removed from the registry.
    Deleted,
}

/// Snapshot of one worker's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStatus {
    pub state: WorkerState,
    /// Run-loop invocations in the current supervision.
    pub attempts: u32,
    /// Crash-triggered retries in the current supervision.
    pub retries: u32,
    /// Supervision generation; unique per start.
    pub generation: u64,
}

/// Thread-safe tracker of worker lifecycles.
#[derive(Default)]
pub struct LifecycleTracker {
    state: RwLock<HashMap<String, WorkerStatus>>,
    generations: AtomicU64,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly instantiated worker.
    ///
    /// The fresh generation fences off any supervision of a replaced instance.
    pub async fn created(&self, name: &str) {
        let generation = self.next_generation();
        self.state.write().await.insert(
            name.to_string(),
            WorkerStatus {
                state: WorkerState::Created,
                attempts: 0,
                retries: 0,
                generation,
            },
        );
    }

    /// Moves to `Started` with fresh counters and returns the new generation.
    pub async fn started(&self, name: &str) -> u64 {
        let generation = self.next_generation();
        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(WorkerStatus {
            state: WorkerState::Created,
            attempts: 0,
            retries: 0,
            generation,
        });
        entry.generation = generation;
        entry.state = WorkerState::Started;
        entry.attempts = 0;
        entry.retries = 0;
        generation
    }

    /// An attempt is starting.
    pub async fn attempt(&self, name: &str, generation: u64) {
        self.apply(name, generation, |s| {
            s.attempts += 1;
            s.state = WorkerState::Running;
        })
        .await;
    }

    /// A crash is being retried.
    pub async fn retrying(&self, name: &str, generation: u64) {
        self.apply(name, generation, |s| {
            s.retries += 1;
            s.state = WorkerState::Retrying;
        })
        .await;
    }

    /// Supervision ended with `state` (`Stopped` or `Abandoned`).
    pub async fn finished(&self, name: &str, generation: u64, state: WorkerState) {
        self.apply(name, generation, |s| s.state = state).await;
    }

    /// Sets `state` regardless of generation (control-path transitions).
    pub async fn mark(&self, name: &str, state: WorkerState) {
        if let Some(s) = self.state.write().await.get_mut(name) {
            s.state = state;
        }
    }

    /// Marks the worker as deleted and fences off its running supervision.
    pub async fn deleted(&self, name: &str) {
        if let Some(s) = self.state.write().await.get_mut(name) {
            s.state = WorkerState::Deleted;
            s.generation = self.next_generation();
        }
    }

    /// Forgets every worker. Supervisions still winding down can no longer update anything.
    pub async fn clear(&self) {
        self.state.write().await.clear();
    }

    pub async fn status(&self, name: &str) -> Option<WorkerStatus> {
        self.state.read().await.get(name).copied()
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn apply(&self, name: &str, generation: u64, f: impl FnOnce(&mut WorkerStatus)) {
        let mut state = self.state.write().await;
        if let Some(s) = state.get_mut(name) {
            if s.generation == generation {
                f(s);
            }
        }
    }
}
