//! Database query repositories for the flow store.
//!
//! Repositories are stateless and operate on a caller-provided connection.
//! A multi-step service operation opens one transaction and threads the same
//! connection through every repository call, so every nested read observes
//! the transaction's snapshot and every write joins its atomic unit of work.

pub mod flow;
pub mod flow_version;

pub use flow::FlowRepository;
pub use flow_version::FlowVersionRepository;
