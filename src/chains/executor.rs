//! # Chain executor boundary.
//!
//! Provides [`ChainExecutor`], the extension point through which the rule system
//! receives events. The dispatcher calls it once per event from a dedicated task.
//!
//! ## Rules
//! - Invocations for different events may run **concurrently** and finish out of order.
//! - Errors and panics are caught and logged by the dispatcher; they never stop the bus.
//! - There is no cancellation of an invocation once dispatched.

use async_trait::async_trait;

use super::chain::Chain;
use crate::error::ChainError;
use crate::events::Event;

/// Rule engine entry point.
#[async_trait]
pub trait ChainExecutor: Send + Sync + 'static {
    /// Evaluates `chains` against `event` and runs whatever actions match.
    async fn execute(&self, chains: &[Chain], event: &Event) -> Result<(), ChainError>;
}

/// Executor that ignores every event. Used when no rule system is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExecutor;

#[async_trait]
impl ChainExecutor for NoopExecutor {
    async fn execute(&self, _chains: &[Chain], _event: &Event) -> Result<(), ChainError> {
        Ok(())
    }
}
