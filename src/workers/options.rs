//! # Worker configuration options.
//!
//! [`WorkerOptions`] is the ordered option list a worker is created with. Values are
//! raw JSON; workers pull typed values out with [`WorkerOptions::bind`].
//!
//! ## Example
//! ```rust
//! use hivekeeper::{WorkerOption, WorkerOptions};
//!
//! let opts = WorkerOptions::from(vec![
//!     WorkerOption::new("url", "http://hub.local"),
//!     WorkerOption::new("interval", 30),
//! ]);
//!
//! let interval: u64 = opts.bind("interval").unwrap();
//! assert_eq!(interval, 30);
//! assert!(opts.bind::<u64>("missing").is_err());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WorkerError;

/// One named configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl WorkerOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of worker options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerOptions(Vec<WorkerOption>);

impl WorkerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of the first option with this name.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    /// Deserializes the named option into `T`.
    ///
    /// Missing or mistyped options are reported as [`WorkerError::InvalidOptions`],
    /// which factories can return as-is.
    pub fn bind<T: DeserializeOwned>(&self, name: &str) -> Result<T, WorkerError> {
        let value = self
            .value(name)
            .ok_or_else(|| WorkerError::InvalidOptions {
                error: format!("missing option {name:?}"),
            })?;
        serde_json::from_value(value.clone()).map_err(|e| WorkerError::InvalidOptions {
            error: format!("option {name:?}: {e}"),
        })
    }

    /// Appends or replaces an option by name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|o| o.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(WorkerOption { name, value }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkerOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<WorkerOption>> for WorkerOptions {
    fn from(v: Vec<WorkerOption>) -> Self {
        Self(v)
    }
}

impl<'a> IntoIterator for &'a WorkerOptions {
    type Item = &'a WorkerOption;
    type IntoIter = std::slice::Iter<'a, WorkerOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
