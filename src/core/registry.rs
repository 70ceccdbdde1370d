//! # Worker registry: name → worker, class → factory.
//!
//! [`Registry`] is owned by the [`Supervisor`](crate::Supervisor) and shared with the
//! dispatcher, which resolves the producing worker of every event.
//!
//! ## Rules
//! - Names are unique; [`register`](Registry::register) silently replaces an existing entry.
//! - Lookup misses are `None`, never errors.
//! - Enumeration returns snapshots in unspecified order.
//! - Both maps are guarded by a `tokio::sync::RwLock`; mutations come from the
//!   supervisor's control path, reads from anywhere.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use crate::workers::{FactoryRef, WorkerRef};

/// Registry of live workers and known factories.
#[derive(Default)]
pub struct Registry {
    workers: RwLock<HashMap<String, WorkerRef>>,
    factories: RwLock<HashMap<String, FactoryRef>>,
}

impl Registry {
    /// Creates a registry pre-populated with factories (later ids win).
    pub fn with_factories(factories: impl IntoIterator<Item = FactoryRef>) -> Self {
        let factories = factories
            .into_iter()
            .map(|f| (f.id().to_string(), f))
            .collect();
        Self {
            workers: RwLock::default(),
            factories: RwLock::new(factories),
        }
    }

    /// Inserts or replaces a worker by name.
    pub async fn register(&self, worker: WorkerRef) {
        info!(
            worker = worker.name(),
            description = %worker.description(),
            "worker ready"
        );
        self.workers
            .write()
            .await
            .insert(worker.name().to_string(), worker);
    }

    /// Returns the worker with this name.
    pub async fn get(&self, name: &str) -> Option<WorkerRef> {
        self.workers.read().await.get(name).cloned()
    }

    /// Returns all registered workers.
    pub async fn workers(&self) -> Vec<WorkerRef> {
        self.workers.read().await.values().cloned().collect()
    }

    /// Returns sorted list of registered worker names.
    pub async fn names(&self) -> Vec<String> {
        let workers = self.workers.read().await;
        let mut names: Vec<String> = workers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Stops the worker, then removes its name. Returns the removed handle, if any.
    pub async fn delete(&self, worker: &WorkerRef) -> Option<WorkerRef> {
        worker.stop();
        self.workers.write().await.remove(worker.name())
    }

    /// Removes every worker and returns them.
    pub async fn clear(&self) -> Vec<WorkerRef> {
        let mut workers = self.workers.write().await;
        workers.drain().map(|(_, w)| w).collect()
    }

    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Inserts or replaces a factory by class id.
    pub async fn register_factory(&self, factory: FactoryRef) {
        info!(class = factory.id(), "factory registered");
        self.factories
            .write()
            .await
            .insert(factory.id().to_string(), factory);
    }

    /// Returns the factory for this class.
    pub async fn factory(&self, class: &str) -> Option<FactoryRef> {
        self.factories.read().await.get(class).cloned()
    }

    /// Returns all registered factories.
    pub async fn factories(&self) -> Vec<FactoryRef> {
        self.factories.read().await.values().cloned().collect()
    }
}
