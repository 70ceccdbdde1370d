//! # Supervisor: owns the registry, the event bus and every worker's supervision.
//!
//! The [`Supervisor`] is the single control path of the hive. It instantiates workers
//! through registered factories, starts their supervised run-loops, opens and closes
//! the event bus, and routes actions.
//!
//! ## High-level architecture
//! ```text
//! Vec<WorkerDescriptor> ──► Supervisor::start_all()
//!
//! start_all:
//!   open_bus() ──► Bus::new(cfg.bus_capacity) ──► Dispatcher::spawn()
//!   for each descriptor:
//!       start_one(d)
//!         ├─► instantiate(d): registry.factory(d.class)?.create(..) ──► registry.register()
//!         ├─► worker.start()
//!         └─► tokio::spawn(WorkerActor::run())   (one supervision task per worker)
//!
//! Event flow:
//!   Worker::run ── publish(Event) ──► Bus ──► Dispatcher ──► ChainExecutor (task per event)
//!
//! stop_all:
//!   worker.stop() for all ──► bus.close() ──► dispatcher exits ──► registry.clear()
//! ```
//!
//! ## Rules
//! - Unknown factory classes are the only error a normal start can produce.
//! - Worker crashes are absorbed by supervision; nothing above observes them.
//! - The bus lives from `open_bus` (or the first `start_one`) until `stop_all`.
//! - Control operations are serialized by one async lock held for their whole
//!   sequence; the supervisor is shareable (`Arc<Supervisor>`) across tasks.
//! - `stop_all` forgets workers and their lifecycle entries in one step.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use hivekeeper::{
//!     Action, Bus, Config, FactoryFn, Placeholder, Supervisor, Worker, WorkerBase,
//!     WorkerDescriptor, WorkerError, WorkerOptions, WorkerRef,
//! };
//!
//! struct Idle { base: WorkerBase }
//!
//! #[async_trait]
//! impl Worker for Idle {
//!     fn base(&self) -> &WorkerBase { &self.base }
//!     async fn run(&self, ctx: CancellationToken, _events: Bus) -> Result<(), WorkerError> {
//!         ctx.cancelled().await;
//!         Ok(())
//!     }
//!     async fn handle_action(&self, _a: &Action) -> Result<Vec<Placeholder>, WorkerError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(Config::default())
//!         .with_factory(FactoryFn::arc("idle", |name: &str, desc: &str, opts: WorkerOptions| {
//!             Ok(Arc::new(Idle { base: WorkerBase::new(name, "idle", desc, opts) }) as WorkerRef)
//!         }))
//!         .build();
//!
//!     sup.start_all(vec![WorkerDescriptor::new("idle1", "idle")]).await?;
//!     assert!(sup.worker("idle1").await.unwrap().is_running());
//!
//!     sup.shutdown().await?;
//!     assert!(sup.workers().await.is_empty());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::actor::WorkerActor;
use super::builder::SupervisorBuilder;
use super::config::Config;
use super::dispatcher::Dispatcher;
use super::lifecycle::{LifecycleTracker, WorkerState, WorkerStatus};
use super::registry::Registry;
use super::shutdown;
use crate::chains::{Chain, ChainExecutor, Chains};
use crate::error::{ActionError, RuntimeError};
use crate::events::{Action, Bus, Placeholder};
use crate::workers::{CompletionHandle, FactoryRef, WorkerDescriptor, WorkerRef};

/// Bus currently accepting events, with its dispatcher task.
struct OpenBus {
    bus: Bus,
    dispatcher: JoinHandle<()>,
}

/// Proof that the caller holds the supervisor's control lock.
type Control<'a> = MutexGuard<'a, ()>;

/// Coordinates worker instantiation, supervision, the event bus and shutdown.
///
/// Control operations (register, instantiate, start, stop, restart, delete) are
/// serialized by one lock, so each runs as a unit with respect to the others.
pub struct Supervisor {
    cfg: Config,
    registry: Arc<Registry>,
    lifecycle: Arc<LifecycleTracker>,
    executor: Arc<dyn ChainExecutor>,
    chains: Chains,
    bus: Mutex<Option<OpenBus>>,
    control: Mutex<()>,
}

impl Supervisor {
    /// Creates a builder for constructing a Supervisor.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        registry: Registry,
        executor: Arc<dyn ChainExecutor>,
        chains: Chains,
    ) -> Self {
        Self {
            cfg,
            registry: Arc::new(registry),
            lifecycle: Arc::new(LifecycleTracker::new()),
            executor,
            chains,
            bus: Mutex::new(None),
            control: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ---------------------------
    // Registry access
    // ---------------------------

    pub async fn register_factory(&self, factory: FactoryRef) {
        self.registry.register_factory(factory).await;
    }

    pub async fn factory(&self, class: &str) -> Option<FactoryRef> {
        self.registry.factory(class).await
    }

    pub async fn factories(&self) -> Vec<FactoryRef> {
        self.registry.factories().await
    }

    /// Registers an already constructed worker (not started).
    pub async fn register(&self, worker: WorkerRef) {
        let held = self.control.lock().await;
        self.register_locked(&held, worker).await;
    }

    pub async fn worker(&self, name: &str) -> Option<WorkerRef> {
        self.registry.get(name).await
    }

    pub async fn workers(&self) -> Vec<WorkerRef> {
        self.registry.workers().await
    }

    /// Returns the sorted names of registered workers.
    pub async fn worker_names(&self) -> Vec<String> {
        self.registry.names().await
    }

    pub async fn worker_count(&self) -> usize {
        self.registry.len().await
    }

    /// Returns lifecycle state and attempt counters for a worker.
    ///
    /// Entries survive deletion and abandonment; `stop_all` forgets them all.
    pub async fn status(&self, name: &str) -> Option<WorkerStatus> {
        self.lifecycle.status(name).await
    }

    /// Stops a worker and removes it from the registry.
    pub async fn delete(&self, name: &str) -> Option<WorkerRef> {
        let _held = self.control.lock().await;
        let worker = self.registry.get(name).await?;
        let removed = self.registry.delete(&worker).await;
        self.lifecycle.deleted(name).await;
        info!(worker = name, "worker deleted");
        removed
    }

    // ---------------------------
    // Chains
    // ---------------------------

    /// Replaces the active chain set; takes effect for the next dispatched event.
    pub fn set_chains(&self, chains: Vec<Chain>) {
        self.chains.set(chains);
    }

    pub fn chains(&self) -> Arc<[Chain]> {
        self.chains.snapshot()
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Builds a worker through its factory and registers it.
    ///
    /// Fails with [`RuntimeError::UnknownFactory`] or [`RuntimeError::FactoryFailed`];
    /// on failure nothing is registered.
    pub async fn instantiate(&self, d: &WorkerDescriptor) -> Result<WorkerRef, RuntimeError> {
        let held = self.control.lock().await;
        self.instantiate_locked(&held, d).await
    }

    /// Instantiates a worker, starts it and launches its supervision.
    ///
    /// Opens the bus if none is open.
    pub async fn start_one(&self, d: &WorkerDescriptor) -> Result<WorkerRef, RuntimeError> {
        let held = self.control.lock().await;
        self.start_one_locked(&held, d).await
    }

    /// Opens a fresh bus and starts every descriptor in order.
    ///
    /// Stops at the first configuration error; workers started before it keep running.
    pub async fn start_all(&self, descriptors: Vec<WorkerDescriptor>) -> Result<(), RuntimeError> {
        let held = self.control.lock().await;
        self.start_all_locked(&held, &descriptors).await
    }

    /// Stops every worker, closes the bus and empties the registry and lifecycle tracker.
    ///
    /// Does not wait for run-loops to return; see [`shutdown`](Self::shutdown).
    pub async fn stop_all(&self) {
        let held = self.control.lock().await;
        self.stop_all_locked(&held).await;
    }

    /// [`stop_all`](Self::stop_all), then waits up to `cfg.grace` for every run-loop to return.
    ///
    /// The wait happens after the control lock is released.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let pending = {
            let held = self.control.lock().await;
            let pending: Vec<(String, CompletionHandle)> = self
                .registry
                .workers()
                .await
                .iter()
                .map(|w| (w.name().to_string(), w.completion()))
                .collect();
            self.stop_all_locked(&held).await;
            pending
        };

        let grace = self.cfg.grace;
        let all_done = join_all(pending.iter().map(|(_, c)| c.wait()));
        if tokio::time::timeout(grace, all_done).await.is_ok() {
            info!("all workers stopped within grace");
            return Ok(());
        }

        let mut stuck: Vec<String> = pending
            .into_iter()
            .filter(|(_, c)| !c.is_done())
            .map(|(name, _)| name)
            .collect();
        stuck.sort_unstable();
        warn!(?grace, ?stuck, "grace exceeded");
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Stops a worker, re-arms its stop signal and completion handle, and starts it again.
    ///
    /// Waits up to `cfg.grace` for the previous run-loop to return before re-arming.
    /// Concurrent restarts of one worker run one after the other.
    pub async fn restart_one(&self, name: &str) -> Result<(), RuntimeError> {
        let _held = self.control.lock().await;
        let worker = self
            .registry
            .get(name)
            .await
            .ok_or_else(|| RuntimeError::UnknownWorker {
                name: name.to_string(),
            })?;

        worker.stop();
        let never_started = matches!(
            self.lifecycle.status(name).await.map(|s| s.state),
            Some(WorkerState::Created) | None
        );
        if !never_started && !worker.completion().wait_for(self.cfg.grace).await {
            return Err(RuntimeError::GraceExceeded {
                grace: self.cfg.grace,
                stuck: vec![name.to_string()],
            });
        }
        self.lifecycle.mark(name, WorkerState::Restarted).await;

        worker.set_stop_signal(CancellationToken::new());
        worker.set_completion(CompletionHandle::new());
        info!(worker = name, "restarting worker");

        let bus = self.ensure_bus().await;
        self.launch(&worker, bus).await;
        Ok(())
    }

    /// Stops everything, then starts a fresh set of workers on a fresh bus.
    pub async fn restart_all(&self, descriptors: Vec<WorkerDescriptor>) -> Result<(), RuntimeError> {
        let held = self.control.lock().await;
        self.stop_all_locked(&held).await;
        self.start_all_locked(&held, &descriptors).await
    }

    /// Starts `descriptors`, waits for an OS termination signal, then shuts down.
    pub async fn serve(&self, descriptors: Vec<WorkerDescriptor>) -> Result<(), RuntimeError> {
        self.start_all(descriptors).await?;
        match shutdown::wait_for_shutdown_signal().await {
            Ok(signal) => info!(signal, "shutdown requested"),
            Err(e) => warn!(error = %e, "signal registration failed; shutting down"),
        }
        self.shutdown().await
    }

    // ---------------------------
    // Actions
    // ---------------------------

    /// Routes an action to its target worker and returns the worker's result values.
    pub async fn execute_action(&self, action: &Action) -> Result<Vec<Placeholder>, ActionError> {
        let worker =
            self.registry
                .get(&action.worker)
                .await
                .ok_or_else(|| ActionError::UnknownWorker {
                    name: action.worker.clone(),
                })?;

        worker.log_action();
        info!(worker = %action.worker, action = %action.name, "executing action");
        Ok(worker.handle_action(action).await?)
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    async fn register_locked(&self, _held: &Control<'_>, worker: WorkerRef) {
        self.lifecycle.created(worker.name()).await;
        self.registry.register(worker).await;
    }

    async fn instantiate_locked(
        &self,
        held: &Control<'_>,
        d: &WorkerDescriptor,
    ) -> Result<WorkerRef, RuntimeError> {
        let factory = self
            .registry
            .factory(&d.class)
            .await
            .ok_or_else(|| RuntimeError::UnknownFactory {
                class: d.class.clone(),
            })?;

        let worker = factory
            .create(&d.name, &d.description, d.options.clone())
            .map_err(|error| RuntimeError::FactoryFailed {
                class: d.class.clone(),
                name: d.name.clone(),
                error,
            })?;

        self.register_locked(held, worker.clone()).await;
        Ok(worker)
    }

    async fn start_one_locked(
        &self,
        held: &Control<'_>,
        d: &WorkerDescriptor,
    ) -> Result<WorkerRef, RuntimeError> {
        let worker = self.instantiate_locked(held, d).await?;
        let bus = self.ensure_bus().await;
        self.launch(&worker, bus).await;
        Ok(worker)
    }

    async fn start_all_locked(
        &self,
        held: &Control<'_>,
        descriptors: &[WorkerDescriptor],
    ) -> Result<(), RuntimeError> {
        self.open_bus().await;
        for d in descriptors {
            self.start_one_locked(held, d).await?;
        }
        Ok(())
    }

    async fn stop_all_locked(&self, _held: &Control<'_>) {
        let workers = self.registry.clear().await;
        info!(count = workers.len(), "stopping all workers");
        for worker in &workers {
            info!(worker = worker.name(), "stopping worker");
            worker.stop();
        }

        if let Some(open) = self.bus.lock().await.take() {
            open.bus.close();
            if let Err(e) = open.dispatcher.await {
                warn!(error = %e, "event dispatcher ended abnormally");
            }
        }

        self.lifecycle.clear().await;
    }

    /// Closes any open bus and opens a new one with its dispatcher.
    async fn open_bus(&self) {
        let mut slot = self.bus.lock().await;
        if let Some(old) = slot.take() {
            old.bus.close();
        }
        *slot = Some(self.spawn_bus());
    }

    /// Returns the open bus, opening one if needed.
    async fn ensure_bus(&self) -> Bus {
        let mut slot = self.bus.lock().await;
        match slot.as_ref() {
            Some(open) if !open.bus.is_closed() => open.bus.clone(),
            _ => {
                let open = self.spawn_bus();
                let bus = open.bus.clone();
                *slot = Some(open);
                bus
            }
        }
    }

    fn spawn_bus(&self) -> OpenBus {
        let (bus, rx) = Bus::new(self.cfg.bus_capacity_clamped());
        let dispatcher = Dispatcher::new(
            rx,
            Arc::clone(&self.registry),
            Arc::clone(&self.executor),
            self.chains.clone(),
        )
        .spawn();
        info!("event dispatcher started");
        OpenBus { bus, dispatcher }
    }

    /// Marks the worker started and spawns its supervision task.
    async fn launch(&self, worker: &WorkerRef, bus: Bus) {
        let generation = self.lifecycle.started(worker.name()).await;
        worker.start();

        let actor = WorkerActor::new(
            Arc::clone(worker),
            bus,
            Arc::clone(&self.lifecycle),
            self.cfg.max_fatals_clamped(),
            generation,
        );
        tokio::spawn(actor.run());
    }
}
