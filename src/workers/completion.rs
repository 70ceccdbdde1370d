//! # Completion handle for one supervised run.
//!
//! A [`CompletionHandle`] is a one-shot latch: the supervisor marks it done when
//! supervision of a worker ends (normal return, stop, or abandonment) and anyone
//! holding a clone can await that moment.
//!
//! ## Rules
//! - Marked done **once per supervision**, never per retry.
//! - Marking is idempotent; a second `mark_done` is a no-op.
//! - Restart issues a **fresh** handle; old clones stay done.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cloneable one-shot "run-loop finished" latch.
#[derive(Clone, Debug, Default)]
pub struct CompletionHandle {
    done: CancellationToken,
}

impl CompletionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the run-loop as finished and wakes all waiters.
    pub fn mark_done(&self) {
        self.done.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Waits until the run-loop has finished.
    pub async fn wait(&self) {
        self.done.cancelled().await;
    }

    /// Waits up to `grace`; returns `false` if the run-loop is still active.
    pub async fn wait_for(&self, grace: Duration) -> bool {
        tokio::time::timeout(grace, self.wait()).await.is_ok()
    }
}
