//! Compiled flow graph.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use uuid::Uuid;

use crate::registry::Executor;

/// The structural role of a compiled node, with its executor bound.
#[derive(Clone)]
pub enum NodeRole {
    /// Entry point of the flow.
    Entry,
    /// Terminal marker.
    Terminal,
    /// Delegates to a resolved executor.
    Execution(Arc<dyn Executor>),
    /// Collects input from the end user.
    Prompt,
    /// Branches on a preceding outcome.
    Decision,
}

impl fmt::Debug for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Entry => f.write_str("Entry"),
            NodeRole::Terminal => f.write_str("Terminal"),
            NodeRole::Execution(executor) => {
                f.debug_tuple("Execution").field(&executor.name()).finish()
            }
            NodeRole::Prompt => f.write_str("Prompt"),
            NodeRole::Decision => f.write_str("Decision"),
        }
    }
}

impl NodeRole {
    /// Returns the bound executor for execution nodes.
    pub fn executor(&self) -> Option<&Arc<dyn Executor>> {
        match self {
            NodeRole::Execution(executor) => Some(executor),
            _ => None,
        }
    }
}

/// A node of a compiled graph.
#[derive(Debug, Clone)]
pub struct CompiledNode {
    /// Definition id of the node.
    pub id: String,
    /// Structural role with executor binding.
    pub role: NodeRole,
    /// Display metadata carried over from the definition.
    pub meta: Option<serde_json::Value>,
}

/// A compiled flow graph ready for execution.
///
/// This is the runtime representation of a flow's active version after
/// compilation: every node kind resolved into its structural role, every
/// execution node bound to a registry executor, and the transition structure
/// validated.
pub struct CompiledGraph {
    /// Flow this graph was compiled from.
    flow_id: Uuid,
    /// The underlying directed graph.
    graph: DiGraph<CompiledNode, ()>,
    /// Map from node ids to graph indices.
    node_indices: HashMap<String, NodeIndex>,
    /// Map from graph indices to node ids.
    index_to_id: HashMap<NodeIndex, String>,
    /// Index of the entry node.
    entry: NodeIndex,
}

impl CompiledGraph {
    /// Creates a new compiled graph.
    pub(crate) fn new(
        flow_id: Uuid,
        graph: DiGraph<CompiledNode, ()>,
        node_indices: HashMap<String, NodeIndex>,
        entry: NodeIndex,
    ) -> Self {
        let index_to_id = node_indices.iter().map(|(k, v)| (*v, k.clone())).collect();
        Self {
            flow_id,
            graph,
            node_indices,
            index_to_id,
            entry,
        }
    }

    /// Returns the id of the flow this graph belongs to.
    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of transitions in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the entry node.
    pub fn entry(&self) -> &CompiledNode {
        &self.graph[self.entry]
    }

    /// Returns a node by definition id.
    pub fn node(&self, id: &str) -> Option<&CompiledNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Returns an iterator over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &CompiledNode> {
        self.graph.node_weights()
    }

    /// Returns an iterator over terminal nodes.
    pub fn terminal_nodes(&self) -> impl Iterator<Item = &CompiledNode> {
        self.nodes()
            .filter(|node| matches!(node.role, NodeRole::Terminal))
    }

    /// Returns the successors (outgoing transitions) of a node.
    pub fn successors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Returns the predecessors (incoming transitions) of a node.
    pub fn predecessors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> impl Iterator<Item = &str> {
        self.node_indices.get(id).into_iter().flat_map(move |&idx| {
            self.graph
                .neighbors_directed(idx, direction)
                .filter_map(|neighbor| self.index_to_id.get(&neighbor).map(String::as_str))
        })
    }

    /// Returns node ids in topological order (entry first).
    ///
    /// Returns `None` if the graph contains a cycle. Cycles are legal: a
    /// journey may loop back to a prompt on a failed attempt.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        petgraph::algo::toposort(&self.graph, None).ok().map(|indices| {
            indices
                .into_iter()
                .filter_map(|idx| self.index_to_id.get(&idx).map(String::as_str))
                .collect()
        })
    }
}

impl fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("flow_id", &self.flow_id)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish_non_exhaustive()
    }
}
