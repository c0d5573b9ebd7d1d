//! Graph builder: compile-on-miss with per-flow caching.

use std::sync::Arc;

use uuid::Uuid;

use super::cache::GraphCache;
use super::compiled::CompiledGraph;
use super::compiler::GraphCompiler;
use crate::definition::NodeDef;
use crate::error::FlowResult;
use crate::registry::ExecutorRegistry;
use crate::TRACING_TARGET_GRAPH;

/// Builds and caches compiled graphs, one per flow id.
///
/// Mutation paths (update, delete, restore) call [`invalidate`] after their
/// transaction commits; read paths never do. A subsequent read then observes
/// either the empty cache or a freshly compiled graph, never the
/// pre-mutation one.
///
/// [`invalidate`]: GraphBuilder::invalidate
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    registry: Arc<ExecutorRegistry>,
    cache: GraphCache,
}

impl GraphBuilder {
    /// Creates a builder resolving executors from the given registry.
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self {
            registry,
            cache: GraphCache::new(),
        }
    }

    /// Returns the compiled graph for a flow, compiling on cache miss.
    pub fn graph(&self, flow_id: Uuid, nodes: &[NodeDef]) -> FlowResult<Arc<CompiledGraph>> {
        if let Some(graph) = self.cache.get(flow_id) {
            tracing::debug!(target: TRACING_TARGET_GRAPH, flow_id = %flow_id, "Graph cache hit");
            return Ok(graph);
        }

        let graph = Arc::new(GraphCompiler::new(&self.registry).compile(flow_id, nodes)?);
        self.cache.insert(Arc::clone(&graph));

        tracing::debug!(
            target: TRACING_TARGET_GRAPH,
            flow_id = %flow_id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Compiled and cached flow graph"
        );

        Ok(graph)
    }

    /// Drops the cached graph for a flow, if any.
    pub fn invalidate(&self, flow_id: Uuid) {
        let existed = self.cache.invalidate(flow_id);
        tracing::debug!(
            target: TRACING_TARGET_GRAPH,
            flow_id = %flow_id,
            existed,
            "Invalidated graph cache entry"
        );
    }

    /// Returns the executor registry backing this builder.
    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ExecutorRef, NodeDef, NodeKind};
    use crate::registry::Executor;

    struct Noop;

    impl Executor for Noop {
        fn name(&self) -> &str {
            "noop"
        }
    }

    fn builder() -> GraphBuilder {
        let mut registry = ExecutorRegistry::new();
        registry.register(Noop);
        GraphBuilder::new(Arc::new(registry))
    }

    fn nodes(executor: &str) -> Vec<NodeDef> {
        vec![
            NodeDef::new("start", NodeKind::Start).with_next("task"),
            NodeDef::new("task", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new(executor))
                .with_next("done"),
            NodeDef::new("done", NodeKind::End),
        ]
    }

    #[test]
    fn caches_per_flow_id() {
        let builder = builder();
        let flow_id = Uuid::now_v7();

        let first = builder.graph(flow_id, &nodes("noop")).unwrap();
        let second = builder.graph(flow_id, &nodes("noop")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.cache().len(), 1);
    }

    #[test]
    fn invalidation_forces_recompile() {
        let builder = builder();
        let flow_id = Uuid::now_v7();

        let before = builder.graph(flow_id, &nodes("noop")).unwrap();
        builder.invalidate(flow_id);
        assert!(builder.cache().is_empty());

        let after = builder.graph(flow_id, &nodes("noop")).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn invalidating_absent_entry_is_safe() {
        let builder = builder();
        builder.invalidate(Uuid::now_v7());
    }

    #[test]
    fn compile_failure_caches_nothing() {
        let builder = builder();
        let flow_id = Uuid::now_v7();

        assert!(builder.graph(flow_id, &nodes("unknown")).is_err());
        assert!(builder.cache().is_empty());
    }
}
