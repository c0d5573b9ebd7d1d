#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for flow management operations.
pub const TRACING_TARGET_FLOW: &str = "signet_service::flow";

mod config;
mod error;
pub mod flow;
mod pagination;

pub use config::FlowConfig;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use flow::{FlowDefinition, FlowPage, FlowService};
pub use pagination::{PageLink, PageLinks, build_links};
