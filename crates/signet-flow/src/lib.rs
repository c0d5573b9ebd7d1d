#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for graph compilation and cache operations.
pub const TRACING_TARGET_GRAPH: &str = "signet_flow::graph";

/// Tracing target for executor registry operations.
pub const TRACING_TARGET_REGISTRY: &str = "signet_flow::registry";

pub mod definition;
mod error;
pub mod graph;
mod registry;

pub use crate::definition::{ExecutorRef, NodeDef, NodeKind};
pub use crate::error::{FlowError, FlowResult};
pub use crate::graph::{CompiledGraph, CompiledNode, GraphBuilder, GraphCache, NodeRole};
pub use crate::registry::{Executor, ExecutorRegistry, apply_default_meta};
