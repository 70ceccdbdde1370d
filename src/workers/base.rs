//! # Reusable worker bookkeeping.
//!
//! [`WorkerBase`] holds everything the [`Worker`](crate::Worker) contract needs besides
//! the run-loop and the action handler: identity, description, options, running flag,
//! timestamps, stop signal and completion handle. Concrete workers hold one by value
//! and return it from [`Worker::base`](crate::Worker::base).
//!
//! All fields use interior mutability so every operation takes `&self` and can be
//! called from any task, including concurrently with the worker's own run-loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;

use super::completion::CompletionHandle;
use super::options::WorkerOptions;

/// Shared state embedded (by composition) in every worker.
#[derive(Debug)]
pub struct WorkerBase {
    name: String,
    namespace: String,
    description: RwLock<String>,
    options: RwLock<WorkerOptions>,

    running: AtomicBool,
    last_event: Mutex<Option<SystemTime>>,
    last_action: Mutex<Option<SystemTime>>,

    stop_signal: Mutex<CancellationToken>,
    completion: Mutex<CompletionHandle>,
}

impl WorkerBase {
    /// Creates a base with a fresh stop signal and completion handle.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        description: impl Into<String>,
        options: WorkerOptions,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            description: RwLock::new(description.into()),
            options: RwLock::new(options),
            running: AtomicBool::new(false),
            last_event: Mutex::new(None),
            last_action: Mutex::new(None),
            stop_signal: Mutex::new(CancellationToken::new()),
            completion: Mutex::new(CompletionHandle::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn description(&self) -> String {
        read(&self.description)
    }

    pub fn set_description(&self, description: impl Into<String>) {
        *self
            .description
            .write()
            .unwrap_or_else(PoisonError::into_inner) = description.into();
    }

    pub fn options(&self) -> WorkerOptions {
        read(&self.options)
    }

    pub fn set_options(&self, options: WorkerOptions) {
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = options;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Fires the stop signal and clears the running flag.
    pub fn stop(&self) {
        self.stop_signal().cancel();
        self.running.store(false, Ordering::Release);
    }

    pub fn last_event(&self) -> Option<SystemTime> {
        *lock(&self.last_event)
    }

    pub fn log_event(&self) {
        *lock(&self.last_event) = Some(SystemTime::now());
    }

    pub fn last_action(&self) -> Option<SystemTime> {
        *lock(&self.last_action)
    }

    pub fn log_action(&self) {
        *lock(&self.last_action) = Some(SystemTime::now());
    }

    /// Returns a clone of the current stop signal.
    pub fn stop_signal(&self) -> CancellationToken {
        lock(&self.stop_signal).clone()
    }

    pub fn set_stop_signal(&self, token: CancellationToken) {
        *lock(&self.stop_signal) = token;
    }

    /// Returns a clone of the current completion handle.
    pub fn completion(&self) -> CompletionHandle {
        lock(&self.completion).clone()
    }

    pub fn set_completion(&self, handle: CompletionHandle) {
        *lock(&self.completion) = handle;
    }
}

fn read<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
