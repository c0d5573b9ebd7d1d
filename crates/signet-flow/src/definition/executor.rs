//! Executor reference carried by execution nodes.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a named executor, with the node's own configuration for it.
///
/// The executor itself lives in the registry; a definition only names it.
/// `properties` is opaque to this crate and is handed to the executor
/// unchanged at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExecutorRef {
    /// Registry name of the executor.
    pub name: String,
    /// Executor configuration owned by the referencing node.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub properties: serde_json::Value,
}

impl ExecutorRef {
    /// Creates a reference to the named executor with no configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: serde_json::Value::Null,
        }
    }

    /// Attaches configuration properties to this reference.
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }
}
