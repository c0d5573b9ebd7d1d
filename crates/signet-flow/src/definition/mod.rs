//! Node definition types for administrator-authored flows.
//!
//! A flow definition is an ordered list of [`NodeDef`] entries. Definitions
//! are what administrators author and what the store persists; the
//! [`graph`](crate::graph) module compiles them into executable form.

mod executor;
mod node;

pub use executor::ExecutorRef;
pub use node::{NodeDef, NodeKind};
