//! # Run a single attempt of a worker's run-loop.
//!
//! Invokes [`Worker::run`] once and turns every way it can end into a plain
//! `Result`: a normal return is `Ok(())`, an `Err` is passed through, and a panic is
//! caught at this boundary and converted into [`WorkerError::Panicked`].
//!
//! ## Rules
//! - Exactly **one** invocation of `run` per call
//! - Panics never escape; the supervision task survives them
//! - The stop signal is read **at call time**, so a restart's fresh token is honored

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::{panic_message, WorkerError};
use crate::events::Bus;
use crate::workers::Worker;

/// Executes one attempt of `worker.run`, capturing panics.
pub async fn run_once<W: Worker + ?Sized>(worker: &W, bus: &Bus) -> Result<(), WorkerError> {
    let ctx = worker.stop_signal();
    match AssertUnwindSafe(worker.run(ctx, bus.clone()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(payload) => Err(WorkerError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    }
}
