//! Flow compiler for transforming node lists into executable graphs.
//!
//! Compilation resolves each node's declared kind into its structural role,
//! binds execution nodes to registry executors, and validates graph
//! well-formedness: exactly one entry node, at least one terminal node, no
//! dangling transitions, and full reachability from the entry.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use uuid::Uuid;

use super::compiled::{CompiledGraph, CompiledNode, NodeRole};
use crate::definition::{NodeDef, NodeKind};
use crate::error::{FlowError, FlowResult};
use crate::registry::ExecutorRegistry;

/// Compiles flow node lists into [`CompiledGraph`]s.
pub(crate) struct GraphCompiler<'a> {
    registry: &'a ExecutorRegistry,
}

impl<'a> GraphCompiler<'a> {
    /// Creates a new compiler resolving executors from the given registry.
    pub(crate) fn new(registry: &'a ExecutorRegistry) -> Self {
        Self { registry }
    }

    /// Compiles a node list into an executable graph.
    pub(crate) fn compile(&self, flow_id: Uuid, nodes: &[NodeDef]) -> FlowResult<CompiledGraph> {
        if nodes.is_empty() {
            return Err(FlowError::InvalidDefinition("node list is empty".into()));
        }

        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());
        let mut entries = Vec::new();
        let mut terminals = 0usize;

        for node in nodes {
            if node_indices.contains_key(&node.id) {
                return Err(FlowError::DuplicateNode(node.id.clone()));
            }

            let compiled = self.compile_node(node)?;
            let idx = graph.add_node(compiled);
            if node.kind.is_entry() {
                entries.push(idx);
            }
            if node.kind.is_terminal() {
                terminals += 1;
            }
            node_indices.insert(node.id.clone(), idx);
        }

        let entry = match entries.as_slice() {
            [] => return Err(FlowError::MissingEntryNode),
            [entry] => *entry,
            many => return Err(FlowError::MultipleEntryNodes(many.len())),
        };
        if terminals == 0 {
            return Err(FlowError::MissingTerminalNode);
        }

        for node in nodes {
            let from = node_indices[&node.id];
            for next in &node.next {
                let Some(&to) = node_indices.get(next) else {
                    return Err(FlowError::DanglingTransition {
                        from: node.id.clone(),
                        to: next.clone(),
                    });
                };
                graph.add_edge(from, to, ());
            }
        }

        self.check_reachability(&graph, entry)?;

        Ok(CompiledGraph::new(flow_id, graph, node_indices, entry))
    }

    /// Resolves a node's structural role, binding its executor if any.
    fn compile_node(&self, node: &NodeDef) -> FlowResult<CompiledNode> {
        let role = match node.kind {
            NodeKind::Start => NodeRole::Entry,
            NodeKind::End => NodeRole::Terminal,
            NodeKind::TaskExecution => {
                let executor_ref = node
                    .executor
                    .as_ref()
                    .ok_or_else(|| FlowError::MissingExecutor(node.id.clone()))?;
                NodeRole::Execution(self.registry.resolve(&executor_ref.name)?)
            }
            NodeKind::Prompt => NodeRole::Prompt,
            NodeKind::Decision => NodeRole::Decision,
        };

        Ok(CompiledNode {
            id: node.id.clone(),
            role,
            meta: node.meta.clone(),
        })
    }

    /// Fails if any node is unreachable from the entry node.
    fn check_reachability(
        &self,
        graph: &DiGraph<CompiledNode, ()>,
        entry: NodeIndex,
    ) -> FlowResult<()> {
        let mut visited = vec![false; graph.node_count()];
        let mut bfs = Bfs::new(graph, entry);
        while let Some(idx) = bfs.next(graph) {
            visited[idx.index()] = true;
        }

        for idx in graph.node_indices() {
            if !visited[idx.index()] {
                return Err(FlowError::UnreachableNode(graph[idx].id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ExecutorRef;
    use crate::registry::Executor;

    struct Noop(&'static str);

    impl Executor for Noop {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn registry() -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::new();
        registry.register(Noop("password-validator"));
        registry
    }

    fn login_nodes() -> Vec<NodeDef> {
        vec![
            NodeDef::new("start", NodeKind::Start).with_next("check"),
            NodeDef::new("check", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("password-validator"))
                .with_next("done"),
            NodeDef::new("done", NodeKind::End),
        ]
    }

    #[test]
    fn compiles_minimal_flow() {
        let registry = registry();
        let graph = GraphCompiler::new(&registry)
            .compile(Uuid::now_v7(), &login_nodes())
            .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.entry().id, "start");
        assert_eq!(graph.successors("start").collect::<Vec<_>>(), vec!["check"]);
        assert_eq!(graph.predecessors("done").collect::<Vec<_>>(), vec!["check"]);
        assert_eq!(
            graph.topological_order().unwrap(),
            vec!["start", "check", "done"]
        );

        let check = graph.node("check").unwrap();
        assert_eq!(
            check.role.executor().map(|e| e.name()),
            Some("password-validator")
        );
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let registry = registry();
        let mut nodes = login_nodes();
        nodes.push(NodeDef::new("check", NodeKind::Prompt));

        let err = GraphCompiler::new(&registry)
            .compile(Uuid::now_v7(), &nodes)
            .unwrap_err();
        assert!(matches!(err, FlowError::DuplicateNode(id) if id == "check"));
    }

    #[test]
    fn rejects_missing_or_multiple_entries() {
        let registry = registry();
        let compiler = GraphCompiler::new(&registry);

        let headless = vec![
            NodeDef::new("ask", NodeKind::Prompt).with_next("done"),
            NodeDef::new("done", NodeKind::End),
        ];
        assert!(matches!(
            compiler.compile(Uuid::now_v7(), &headless),
            Err(FlowError::MissingEntryNode)
        ));

        let mut two_headed = login_nodes();
        two_headed.push(NodeDef::new("start2", NodeKind::Start).with_next("check"));
        assert!(matches!(
            compiler.compile(Uuid::now_v7(), &two_headed),
            Err(FlowError::MultipleEntryNodes(2))
        ));
    }

    #[test]
    fn rejects_missing_terminal() {
        let registry = registry();
        let nodes = vec![
            NodeDef::new("start", NodeKind::Start).with_next("ask"),
            NodeDef::new("ask", NodeKind::Prompt),
        ];

        assert!(matches!(
            GraphCompiler::new(&registry).compile(Uuid::now_v7(), &nodes),
            Err(FlowError::MissingTerminalNode)
        ));
    }

    #[test]
    fn rejects_dangling_transition() {
        let registry = registry();
        let mut nodes = login_nodes();
        nodes[1].next = vec!["missing".into()];

        let err = GraphCompiler::new(&registry)
            .compile(Uuid::now_v7(), &nodes)
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::DanglingTransition { from, to } if from == "check" && to == "missing"
        ));
    }

    #[test]
    fn rejects_unreachable_node() {
        let registry = registry();
        let mut nodes = login_nodes();
        nodes.push(NodeDef::new("orphan", NodeKind::Prompt).with_next("done"));

        let err = GraphCompiler::new(&registry)
            .compile(Uuid::now_v7(), &nodes)
            .unwrap_err();
        assert!(matches!(err, FlowError::UnreachableNode(id) if id == "orphan"));
    }

    #[test]
    fn rejects_unbound_execution_node() {
        let registry = registry();
        let mut nodes = login_nodes();
        nodes[1].executor = None;

        assert!(matches!(
            GraphCompiler::new(&registry).compile(Uuid::now_v7(), &nodes),
            Err(FlowError::MissingExecutor(id)) if id == "check"
        ));
    }

    #[test]
    fn rejects_unknown_executor() {
        let registry = registry();
        let mut nodes = login_nodes();
        nodes[1].executor = Some(ExecutorRef::new("magic-link"));

        assert!(matches!(
            GraphCompiler::new(&registry).compile(Uuid::now_v7(), &nodes),
            Err(FlowError::UnknownExecutor(name)) if name == "magic-link"
        ));
    }

    #[test]
    fn loops_are_legal() {
        let registry = registry();
        let nodes = vec![
            NodeDef::new("start", NodeKind::Start).with_next("ask"),
            NodeDef::new("ask", NodeKind::Prompt).with_next("check"),
            NodeDef::new("check", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("password-validator"))
                .with_next("done")
                // Failed attempts return to the prompt.
                .with_next("ask"),
            NodeDef::new("done", NodeKind::End),
        ];

        let graph = GraphCompiler::new(&registry)
            .compile(Uuid::now_v7(), &nodes)
            .unwrap();
        assert_eq!(graph.node_count(), 4);
        assert!(graph.topological_order().is_none());
    }
}
