//! Flow compilation error types.

use thiserror::Error;

/// Result type for flow definition and graph operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur while compiling a flow into a graph.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Flow definition is structurally invalid.
    #[error("invalid flow definition: {0}")]
    InvalidDefinition(String),

    /// Two nodes in the same flow share an identifier.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// The flow has no entry (START) node.
    #[error("flow has no entry node")]
    MissingEntryNode,

    /// The flow has more than one entry (START) node.
    #[error("flow has {0} entry nodes, expected exactly one")]
    MultipleEntryNodes(usize),

    /// The flow has no terminal (END) node.
    #[error("flow has no terminal node")]
    MissingTerminalNode,

    /// A node cannot be reached from the entry node.
    #[error("node {0} is not reachable from the entry node")]
    UnreachableNode(String),

    /// A transition references a node that does not exist.
    #[error("node {from} transitions to unknown node {to}")]
    DanglingTransition {
        /// Node the transition originates from.
        from: String,
        /// Referenced node id that does not exist.
        to: String,
    },

    /// An execution node declares no executor to delegate to.
    #[error("execution node {0} has no executor reference")]
    MissingExecutor(String),

    /// A named executor is not present in the registry.
    #[error("unknown executor: {0}")]
    UnknownExecutor(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
