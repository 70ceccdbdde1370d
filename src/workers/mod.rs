//! # Worker abstractions.
//!
//! - [`Worker`] - capability contract every plugin satisfies
//! - [`WorkerBase`] - reusable bookkeeping state held by composition
//! - [`WorkerRef`] - shared handle (`Arc<dyn Worker>`)
//! - [`Factory`] / [`FactoryFn`] - constructors for one worker class
//! - [`WorkerDescriptor`] - declarative record used to instantiate a worker
//! - [`WorkerOptions`] - ordered option list with typed binding
//! - [`CompletionHandle`] - one-shot latch marking the end of a supervised run

mod base;
mod completion;
mod descriptor;
mod factory;
mod options;
mod worker;

pub use base::WorkerBase;
pub use completion::CompletionHandle;
pub use descriptor::WorkerDescriptor;
pub use factory::{ActionDescriptor, EventDescriptor, Factory, FactoryFn, FactoryRef};
pub use options::{WorkerOption, WorkerOptions};
pub use worker::{Worker, WorkerRef};
