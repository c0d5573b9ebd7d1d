//! Flow version model for PostgreSQL database operations.

use diesel::prelude::*;
use signet_flow::NodeDef;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::flow_versions;
use crate::{PgError, PgResult};

/// An immutable, numbered snapshot of a flow's node list.
///
/// Version numbers increase strictly per flow and are never reused; after
/// history eviction the retained sequence may contain gaps. The node list is
/// stored as a single serialized JSON text blob, a deliberate trade-off of
/// schema simplicity against per-node queryability.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = flow_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FlowVersion {
    /// Surrogate row identifier.
    pub id: i64,
    /// Flow this version belongs to.
    pub flow_id: Uuid,
    /// Version number (strictly increasing per flow).
    pub version: i32,
    /// Serialized node list.
    pub nodes: String,
    /// Timestamp when the version was created.
    pub created_at: OffsetDateTime,
}

/// Data for creating a new flow version.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = flow_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFlowVersion {
    /// Flow the version belongs to.
    pub flow_id: Uuid,
    /// Version number.
    pub version: i32,
    /// Serialized node list.
    pub nodes: String,
}

impl NewFlowVersion {
    /// Creates insert data from an already serialized node payload.
    pub fn new(flow_id: Uuid, version: i32, nodes: String) -> Self {
        Self {
            flow_id,
            version,
            nodes,
        }
    }

    /// Creates insert data by serializing a node list.
    pub fn encode(flow_id: Uuid, version: i32, nodes: &[NodeDef]) -> PgResult<Self> {
        let nodes = serde_json::to_string(nodes).map_err(|source| PgError::Decode {
            flow_id,
            version,
            source,
        })?;

        Ok(Self::new(flow_id, version, nodes))
    }
}

impl FlowVersion {
    /// Returns whether this is the first version of a flow.
    #[inline]
    pub fn is_first_version(&self) -> bool {
        self.version == 1
    }

    /// Returns whether this version is newer than another version number.
    #[inline]
    pub fn is_newer_than(&self, other_version: i32) -> bool {
        self.version > other_version
    }

    /// Decodes the stored node payload into typed definitions.
    ///
    /// Surfaces a typed decode failure naming the flow, the version and the
    /// first offending field, never a generic error.
    pub fn decode_nodes(&self) -> PgResult<Vec<NodeDef>> {
        serde_json::from_str(&self.nodes).map_err(|source| PgError::Decode {
            flow_id: self.flow_id,
            version: self.version,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use signet_flow::NodeKind;

    use super::*;

    #[test]
    fn decode_surfaces_flow_and_version_context() {
        let owner = Uuid::now_v7();
        let stored = FlowVersion {
            id: 1,
            flow_id: owner,
            version: 3,
            // Missing the required "type" field.
            nodes: r#"[{"id": "start"}]"#.into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        match stored.decode_nodes().unwrap_err() {
            PgError::Decode {
                flow_id, version, ..
            } => {
                assert_eq!(flow_id, owner);
                assert_eq!(version, 3);
            }
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn encode_then_decode_preserves_nodes() {
        let nodes = vec![
            signet_flow::NodeDef::new("start", NodeKind::Start).with_next("done"),
            signet_flow::NodeDef::new("done", NodeKind::End),
        ];
        let new_version = NewFlowVersion::encode(Uuid::now_v7(), 1, &nodes).unwrap();

        let stored = FlowVersion {
            id: 1,
            flow_id: new_version.flow_id,
            version: new_version.version,
            nodes: new_version.nodes,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(stored.decode_nodes().unwrap(), nodes);
    }
}
