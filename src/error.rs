//! Error types used by the hivekeeper runtime, workers and chain executors.
//!
//! - [`RuntimeError`]: errors raised by the supervisor itself (configuration, shutdown).
//! - [`WorkerError`]: errors raised by a worker run-loop, factory or action handler.
//! - [`ChainError`]: errors raised by the external chain executor.
//! - [`ActionError`]: errors returned when routing an [`Action`](crate::Action) to a worker.
//! - [`BusClosed`]: the event bus no longer accepts events.
//!
//! Every enum provides `as_label` (a stable snake_case label for logs).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the supervisor.
///
/// Only configuration errors are observable during a normal start; run-time
/// failures of workers are absorbed by supervision and never surface here.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A descriptor names a factory class nobody registered.
    #[error("unknown worker class {class:?}")]
    UnknownFactory {
        /// The requested factory class.
        class: String,
    },

    /// The factory refused to construct the worker.
    #[error("factory {class:?} failed to create worker {name:?}: {error}")]
    FactoryFailed {
        /// The factory class.
        class: String,
        /// The worker name from the descriptor.
        name: String,
        /// What the factory reported.
        error: WorkerError,
    },

    /// A worker with this name is not registered.
    #[error("unknown worker {name:?}")]
    UnknownWorker {
        /// The requested worker name.
        name: String,
    },

    /// Workers did not complete within the configured grace period.
    #[error("grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers whose run-loop had not completed in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use hivekeeper::RuntimeError;
    ///
    /// let err = RuntimeError::UnknownFactory { class: "exec".into() };
    /// assert_eq!(err.as_label(), "runtime_unknown_factory");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::UnknownFactory { .. } => "runtime_unknown_factory",
            RuntimeError::FactoryFailed { .. } => "runtime_factory_failed",
            RuntimeError::UnknownWorker { .. } => "runtime_unknown_worker",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// True for errors caused by bad worker configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            RuntimeError::UnknownFactory { .. } | RuntimeError::FactoryFailed { .. }
        )
    }
}

/// The event bus has been closed; the event was not delivered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("event bus closed")]
pub struct BusClosed;

/// # Errors produced by workers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The run-loop or action failed.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The run-loop or action panicked.
    #[error("worker panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Worker options were missing or malformed.
    #[error("invalid options: {error}")]
    InvalidOptions {
        /// What was wrong with the options.
        error: String,
    },

    /// The worker tried to publish on a closed bus.
    #[error(transparent)]
    Bus(#[from] BusClosed),
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Panicked { .. } => "worker_panicked",
            WorkerError::InvalidOptions { .. } => "worker_invalid_options",
            WorkerError::Bus(_) => "worker_bus_closed",
        }
    }
}

/// # Errors produced by chain execution.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChainError {
    /// Chain execution failed.
    #[error("chain failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Chain execution panicked.
    #[error("chain panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ChainError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChainError::Fail { .. } => "chain_failed",
            ChainError::Panicked { .. } => "chain_panicked",
        }
    }
}

/// # Errors returned when routing an action.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActionError {
    /// No worker with this name is registered.
    #[error("unknown worker {name:?}")]
    UnknownWorker {
        /// The target worker name.
        name: String,
    },

    /// The worker's action handler failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl ActionError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::UnknownWorker { .. } => "action_unknown_worker",
            ActionError::Worker(_) => "action_worker_failed",
        }
    }
}

/// Renders a panic payload captured by `catch_unwind`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_flagged() {
        let unknown = RuntimeError::UnknownFactory {
            class: "nope".into(),
        };
        assert!(unknown.is_config());

        let grace = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(1),
            stuck: vec!["light1".into()],
        };
        assert!(!grace.is_config());
        assert_eq!(grace.as_label(), "runtime_grace_exceeded");
    }

    #[test]
    fn bus_closed_converts_into_worker_error() {
        let err: WorkerError = BusClosed.into();
        assert_eq!(err.as_label(), "worker_bus_closed");
        assert_eq!(err.to_string(), "event bus closed");
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(boxed.as_ref()), "kaboom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
