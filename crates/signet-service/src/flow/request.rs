//! Request types for flow management operations.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use signet_flow::NodeDef;
use signet_postgres::types::FlowType;

/// An administrator-authored flow definition.
///
/// Used for both creation and update; on update the service rejects any
/// change to `handle` or `flow_type`, which are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FlowDefinition {
    /// Handle slug, unique per flow type.
    pub handle: String,
    /// Display name shown to administrators.
    pub display_name: String,
    /// Kind of journey this flow defines.
    pub flow_type: FlowType,
    /// Ordered node list.
    pub nodes: Vec<NodeDef>,
}

impl FlowDefinition {
    /// Creates a definition with the given identity and node list.
    pub fn new(
        handle: impl Into<String>,
        display_name: impl Into<String>,
        flow_type: FlowType,
        nodes: Vec<NodeDef>,
    ) -> Self {
        Self {
            handle: handle.into(),
            display_name: display_name.into(),
            flow_type,
            nodes,
        }
    }
}
