//! Node definition types.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ExecutorRef;

/// The structural kind of a node within a flow.
///
/// The kind decides how the compiler treats a node: `Start`/`End` anchor the
/// graph, `TaskExecution` binds an executor, and the remaining kinds carry
/// opaque payloads for the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Entry point of the flow. Exactly one per flow.
    Start,
    /// Terminal marker. At least one per flow.
    End,
    /// Delegates to a named executor.
    TaskExecution,
    /// Collects input from the end user.
    Prompt,
    /// Branches on the outcome of a preceding node.
    Decision,
}

impl NodeKind {
    /// Returns whether nodes of this kind delegate to an executor.
    #[inline]
    pub fn is_executable(self) -> bool {
        matches!(self, NodeKind::TaskExecution)
    }

    /// Returns whether this kind marks the entry of a flow.
    #[inline]
    pub fn is_entry(self) -> bool {
        matches!(self, NodeKind::Start)
    }

    /// Returns whether this kind terminates a flow.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeKind::End)
    }
}

/// A single node in a flow definition.
///
/// Transition data (`next`) links a node to its successors by id; it is
/// treated as opaque beyond the structural checks the compiler performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NodeDef {
    /// Node identifier, unique within its flow.
    pub id: String,
    /// Structural kind of the node.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Executor reference, required for [`NodeKind::TaskExecution`] nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<ExecutorRef>,
    /// Display/render metadata. Defaulted from the executor when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// Identifiers of successor nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
}

impl NodeDef {
    /// Creates a node of the given kind with no transitions.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            executor: None,
            meta: None,
            next: Vec::new(),
        }
    }

    /// Attaches an executor reference.
    pub fn with_executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Attaches display metadata.
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Appends a successor transition.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next.push(next.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_roles() {
        assert!(NodeKind::Start.is_entry());
        assert!(NodeKind::End.is_terminal());
        assert!(NodeKind::TaskExecution.is_executable());
        assert!(!NodeKind::Prompt.is_executable());
    }

    #[test]
    fn node_def_deserializes_type_tag() {
        let node: NodeDef = serde_json::from_str(
            r#"{
                "id": "verify-password",
                "type": "TASK_EXECUTION",
                "executor": {"name": "password-validator"},
                "next": ["done"]
            }"#,
        )
        .unwrap();

        assert_eq!(node.kind, NodeKind::TaskExecution);
        assert_eq!(node.executor.unwrap().name, "password-validator");
        assert_eq!(node.next, vec!["done"]);
        assert!(node.meta.is_none());
    }

    #[test]
    fn unknown_node_kind_is_rejected() {
        let result = serde_json::from_str::<NodeDef>(r#"{"id": "n", "type": "WEBHOOK"}"#);
        assert!(result.is_err());
    }
}
