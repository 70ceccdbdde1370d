//! # Chain configuration.
//!
//! A [`Chain`] links an event selector to filters and actions. The core never
//! interprets chains; it stores the active set in [`Chains`] and hands a snapshot
//! to the [`ChainExecutor`](crate::ChainExecutor) for every dispatched event.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Which event a chain reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSelector {
    /// Producing worker name.
    pub worker: String,
    /// Event name.
    pub name: String,
}

/// One rule unit: event → filters → actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub event: EventSelector,
    /// Filter names, evaluated by the executor.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Action names, resolved by the executor.
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Active chain set, swapped atomically as a whole.
///
/// Cloning shares the same underlying set.
#[derive(Debug, Clone)]
pub struct Chains {
    inner: Arc<RwLock<Arc<[Chain]>>>,
}

impl Chains {
    pub fn new(chains: Vec<Chain>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chains.into())),
        }
    }

    /// Returns the current set; later [`set`](Self::set) calls don't affect it.
    pub fn snapshot(&self) -> Arc<[Chain]> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole set.
    pub fn set(&self, chains: Vec<Chain>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = chains.into();
    }
}

impl Default for Chains {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
