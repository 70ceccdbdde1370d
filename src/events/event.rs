//! # Domain messages exchanged between workers and the chain system.
//!
//! - [`Event`] a fact reported by a worker ("sensor fired").
//! - [`Action`] a request for a worker to do something ("turn on a light").
//! - [`Filter`] a predicate owned by the chain system; the core only carries it.
//! - [`Placeholder`] a named, typed value attached to events, actions and action results.
//!
//! ## Example
//! ```rust
//! use hivekeeper::{Event, Placeholder};
//!
//! let ev = Event::new("light1", "on")
//!     .with_option(Placeholder::new("brightness", "int", 80));
//!
//! assert_eq!(ev.worker, "light1");
//! assert_eq!(ev.option("brightness").and_then(|v| v.as_i64()), Some(80));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named, typed value.
///
/// `kind` is a free-form type tag ("string", "int", "bool", "url", ...)
/// interpreted by workers and chains; the core never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Looks up a value by name in an ordered placeholder list (first match wins).
pub fn placeholder_value<'a>(list: &'a [Placeholder], name: &str) -> Option<&'a Value> {
    list.iter().find(|p| p.name == name).map(|p| &p.value)
}

/// A fact reported by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Name of the producing worker.
    pub worker: String,
    /// Event name, scoped to the worker's factory.
    pub name: String,
    /// Ordered event payload.
    #[serde(default)]
    pub options: Vec<Placeholder>,
}

impl Event {
    pub fn new(worker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Appends one placeholder to the payload.
    #[inline]
    pub fn with_option(mut self, option: Placeholder) -> Self {
        self.options.push(option);
        self
    }

    /// Returns the value of the named payload entry.
    #[inline]
    pub fn option(&self, name: &str) -> Option<&Value> {
        placeholder_value(&self.options, name)
    }
}

/// A request for a specific worker to perform a named operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the target worker.
    pub worker: String,
    /// Action name, scoped to the worker's factory.
    pub name: String,
    /// Ordered action arguments.
    #[serde(default)]
    pub options: Vec<Placeholder>,
}

impl Action {
    pub fn new(worker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            name: name.into(),
            options: Vec::new(),
        }
    }

    #[inline]
    pub fn with_option(mut self, option: Placeholder) -> Self {
        self.options.push(option);
        self
    }

    #[inline]
    pub fn option(&self, name: &str) -> Option<&Value> {
        placeholder_value(&self.options, name)
    }
}

/// Predicate used by the chain system to test an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub options: Vec<Placeholder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_matching_option_wins() {
        let ev = Event::new("mail", "received")
            .with_option(Placeholder::new("from", "string", "a@example.org"))
            .with_option(Placeholder::new("from", "string", "b@example.org"));

        assert_eq!(ev.option("from"), Some(&json!("a@example.org")));
        assert_eq!(ev.option("subject"), None);
    }

    #[test]
    fn action_deserializes_with_type_tag() {
        let action: Action = serde_json::from_value(json!({
            "worker": "light1",
            "name": "set",
            "options": [{ "name": "state", "type": "bool", "value": true }]
        }))
        .unwrap();

        assert_eq!(action.options[0].kind, "bool");
        assert_eq!(action.option("state"), Some(&json!(true)));
    }

    #[test]
    fn missing_payload_defaults_to_empty() {
        let ev: Event = serde_json::from_value(json!({ "worker": "w", "name": "tick" })).unwrap();
        assert!(ev.options.is_empty());
    }
}
