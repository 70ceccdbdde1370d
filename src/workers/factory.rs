//! # Worker factories.
//!
//! A [`Factory`] produces workers of one class from a name, description and options.
//! Factories are registered once at process start and never mutated.
//!
//! [`FactoryFn`] wraps a closure `F: Fn(&str, &str, WorkerOptions) -> Result<WorkerRef, WorkerError>`
//! so simple classes don't need their own factory type.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use hivekeeper::{
//!     Action, Bus, Factory, FactoryFn, FactoryRef, Placeholder, Worker, WorkerBase,
//!     WorkerError, WorkerOptions, WorkerRef,
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
//! let f: FactoryRef = FactoryFn::arc("idle", |name: &str, desc: &str, opts: WorkerOptions| {
//!     Ok(Arc::new(Idle { base: WorkerBase::new(name, "idle", desc, opts) }) as WorkerRef)
//! });
//!
//! let w = f.create("idle1", "does nothing", WorkerOptions::new()).unwrap();
//! assert_eq!(w.name(), "idle1");
//! assert_eq!(f.id(), "idle");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::options::WorkerOptions;
use super::worker::WorkerRef;
use crate::error::WorkerError;

/// Shared handle to a factory.
pub type FactoryRef = Arc<dyn Factory>;

/// Describes an event a worker class can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Describes an action a worker class can execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// # Constructor for one worker class.
pub trait Factory: Send + Sync + 'static {
    /// Class identifier referenced by [`WorkerDescriptor::class`](crate::WorkerDescriptor).
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Events workers of this class may emit.
    fn events(&self) -> Vec<EventDescriptor> {
        Vec::new()
    }

    /// Actions workers of this class accept.
    fn actions(&self) -> Vec<ActionDescriptor> {
        Vec::new()
    }

    /// Builds one worker. Must not block indefinitely.
    fn create(
        &self,
        name: &str,
        description: &str,
        options: WorkerOptions,
    ) -> Result<WorkerRef, WorkerError>;
}

/// Function-backed factory implementation.
pub struct FactoryFn<F> {
    id: Cow<'static, str>,
    description: Cow<'static, str>,
    events: Vec<EventDescriptor>,
    actions: Vec<ActionDescriptor>,
    f: F,
}

impl<F> FactoryFn<F>
where
    F: Fn(&str, &str, WorkerOptions) -> Result<WorkerRef, WorkerError> + Send + Sync + 'static,
{
    /// Creates a new function-backed factory.
    ///
    /// Prefer [`FactoryFn::arc`] when you immediately need a [`FactoryRef`].
    pub fn new(id: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            id: id.into(),
            description: Cow::Borrowed(""),
            events: Vec::new(),
            actions: Vec::new(),
            f,
        }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(id: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, f))
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares an event; the namespace is this factory's id.
    pub fn with_event(mut self, name: &str, description: &str) -> Self {
        self.events.push(EventDescriptor {
            namespace: self.id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        });
        self
    }

    /// Declares an action; the namespace is this factory's id.
    pub fn with_action(mut self, name: &str, description: &str) -> Self {
        self.actions.push(ActionDescriptor {
            namespace: self.id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        });
        self
    }
}

impl<F> Factory for FactoryFn<F>
where
    F: Fn(&str, &str, WorkerOptions) -> Result<WorkerRef, WorkerError> + Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn events(&self) -> Vec<EventDescriptor> {
        self.events.clone()
    }

    fn actions(&self) -> Vec<ActionDescriptor> {
        self.actions.clone()
    }

    fn create(
        &self,
        name: &str,
        description: &str,
        options: WorkerOptions,
    ) -> Result<WorkerRef, WorkerError> {
        (self.f)(name, description, options)
    }
}

impl<F> std::fmt::Debug for FactoryFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryFn")
            .field("id", &self.id)
            .field("events", &self.events.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}
