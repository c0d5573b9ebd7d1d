//! Database models for the flow store.
//!
//! This module contains Diesel model definitions for the `flows` and
//! `flow_versions` tables, including structs for querying, inserting, and
//! updating records.

mod flow;
mod flow_version;

pub use flow::{Flow, FlowRecord, NewFlow, UpdateFlow};
pub use flow_version::{FlowVersion, NewFlowVersion};
