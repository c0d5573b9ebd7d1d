//! Per-flow cache of compiled graphs.
//!
//! Graphs are compiled once per flow id and cached. The cache is keyed by
//! flow id only, not by version: every mutation path must invalidate its
//! entry, otherwise a stale pre-mutation graph would keep being served.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use super::compiled::CompiledGraph;

/// Caches compiled graphs keyed by flow id.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    inner: Arc<RwLock<HashMap<Uuid, Arc<CompiledGraph>>>>,
}

impl GraphCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached graph for a flow, if any.
    pub fn get(&self, flow_id: Uuid) -> Option<Arc<CompiledGraph>> {
        let cache = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(&flow_id).cloned()
    }

    /// Caches a graph for its flow, replacing any previous entry.
    pub fn insert(&self, graph: Arc<CompiledGraph>) {
        let mut cache = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert(graph.flow_id(), graph);
    }

    /// Drops the cached graph for a flow.
    ///
    /// Safe to call when nothing is cached; returns whether an entry existed.
    pub fn invalidate(&self, flow_id: Uuid) -> bool {
        let mut cache = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        cache.remove(&flow_id).is_some()
    }

    /// Drops all cached graphs.
    pub fn clear(&self) {
        let mut cache = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        cache.clear();
    }

    /// Returns the number of cached graphs.
    pub fn len(&self) -> usize {
        let cache = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        cache.len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
