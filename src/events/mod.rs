//! Domain events and the intake bus.
//!
//! ## Contents
//! - [`Event`], [`Action`], [`Filter`], [`Placeholder`] message data model
//! - [`Bus`] / [`BusReceiver`] bounded mpsc intake channel with explicit close
//!
//! ## Quick reference
//! - **Publishers**: running workers, through the [`Bus`] handed to `Worker::run`.
//! - **Consumer**: the dispatcher in `core::dispatcher`, one per open bus.

mod bus;
mod event;

pub use bus::{Bus, BusReceiver};
pub use event::{placeholder_value, Action, Event, Filter, Placeholder};
