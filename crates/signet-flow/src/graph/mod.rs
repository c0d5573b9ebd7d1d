//! Compiled flow graphs.
//!
//! A [`CompiledGraph`] is the validated, executor-bound form of a flow's node
//! list, derived from the definitions in [`definition`](crate::definition).
//! It is never persisted; the [`GraphBuilder`] caches one per flow id and
//! rebuilds lazily after invalidation.

mod builder;
mod cache;
mod compiled;
mod compiler;

pub use builder::GraphBuilder;
pub use cache::GraphCache;
pub use compiled::{CompiledGraph, CompiledNode, NodeRole};
