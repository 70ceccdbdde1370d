//! Chain boundary: configuration data and the executor trait.
//!
//! Matching semantics live outside this crate; the core only stores the active
//! [`Chains`] and forwards events to a [`ChainExecutor`].

mod chain;
mod executor;

pub use chain::{Chain, Chains, EventSelector};
pub use executor::{ChainExecutor, NoopExecutor};
