//! # Event dispatcher: drains the bus and fans events out to the chain executor.
//!
//! ## Event flow
//! ```text
//! Bus ──► Dispatcher::run()
//!           loop {
//!             ├─► rx.recv()           (None → log "dispatcher stopped", exit)
//!             ├─► registry.get(worker) → worker.log_event()
//!             ├─► info!(event, description, options)
//!             └─► tokio::spawn(execute_isolated(executor, chains.snapshot(), event))
//!           }
//! ```
//!
//! ## Rules
//! - One dispatcher per open bus; it is the only consumer.
//! - Every received event is handed to the executor **exactly once**.
//! - Chain tasks are fire-and-forget: no ordering or mutual exclusion between them.
//! - A failing or panicking chain task is logged and never affects the dispatcher.
//! - An event from an unknown worker is still dispatched; only the timestamp is skipped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::chains::{Chain, ChainExecutor, Chains};
use crate::core::registry::Registry;
use crate::error::{panic_message, ChainError};
use crate::events::{BusReceiver, Event};

/// Single consumer of the event bus.
pub struct Dispatcher {
    rx: BusReceiver,
    registry: Arc<Registry>,
    executor: Arc<dyn ChainExecutor>,
    chains: Chains,
}

impl Dispatcher {
    pub fn new(
        rx: BusReceiver,
        registry: Arc<Registry>,
        executor: Arc<dyn ChainExecutor>,
        chains: Chains,
    ) -> Self {
        Self {
            rx,
            registry,
            executor,
            chains,
        }
    }

    /// Spawns the dispatch loop; the handle completes when the bus closes.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.dispatch(event).await;
        }
        info!("event dispatcher stopped");
    }

    async fn dispatch(&self, event: Event) {
        let description = match self.registry.get(&event.worker).await {
            Some(worker) => {
                worker.log_event();
                self.describe(worker.namespace(), &event.name).await
            }
            None => None,
        };

        info!(
            worker = %event.worker,
            event = %event.name,
            description = description.as_deref().unwrap_or(""),
            "event received"
        );
        for opt in &event.options {
            info!(name = %opt.name, kind = %opt.kind, value = %opt.value, "event option");
        }

        let executor = Arc::clone(&self.executor);
        let chains = self.chains.snapshot();
        tokio::spawn(async move {
            if let Err(e) = execute_isolated(executor.as_ref(), &chains, &event).await {
                error!(
                    worker = %event.worker,
                    event = %event.name,
                    error = %e,
                    label = e.as_label(),
                    "chain execution failed"
                );
            }
        });
    }

    /// Finds the event description published by the worker's factory.
    async fn describe(&self, namespace: &str, event: &str) -> Option<String> {
        let factory = self.registry.factory(namespace).await?;
        factory
            .events()
            .into_iter()
            .find(|d| d.name == event)
            .map(|d| d.description)
    }
}

/// Runs the executor for one event, converting panics into [`ChainError::Panicked`].
async fn execute_isolated(
    executor: &dyn ChainExecutor,
    chains: &[Chain],
    event: &Event,
) -> Result<(), ChainError> {
    match AssertUnwindSafe(executor.execute(chains, event))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(payload) => Err(ChainError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    }
}
