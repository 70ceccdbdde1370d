//! # Declarative worker description.
//!
//! A [`WorkerDescriptor`] names a worker, the factory class that builds it, and the
//! options it is built with. Descriptors usually come from a configuration file; the
//! supervisor consumes each one once, at instantiation.
//!
//! ## Example
//! ```rust
//! use hivekeeper::WorkerDescriptor;
//!
//! let d: WorkerDescriptor = serde_json::from_str(r#"{
//!     "name": "light1",
//!     "class": "exec",
//!     "description": "hallway light",
//!     "options": [{ "name": "cmd", "value": "/usr/bin/light" }]
//! }"#).unwrap();
//!
//! assert_eq!(d.class, "exec");
//! assert_eq!(d.options.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use super::options::{WorkerOption, WorkerOptions};

/// Configuration record used to instantiate one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    /// Unique worker name (registry key).
    pub name: String,
    /// Factory class identifier.
    pub class: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: WorkerOptions,
}

impl WorkerDescriptor {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            description: String::new(),
            options: WorkerOptions::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_option(mut self, option: WorkerOption) -> Self {
        self.options.set(option.name, option.value);
        self
    }
}
