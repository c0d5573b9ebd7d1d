//! Flow metadata model for PostgreSQL database operations.

use diesel::prelude::*;
use signet_flow::NodeDef;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::flows;
use crate::types::FlowType;

/// Flow metadata row.
///
/// The node list itself lives in the version rows; a flow row carries the
/// identity of the journey and the pointer to its active version. `handle`
/// and `flow_type` are immutable once created, and `active_version` only
/// ever increases.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = flows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Flow {
    /// Unique flow identifier (UUIDv7, time-ordered).
    pub id: Uuid,
    /// Human-chosen slug, unique per flow type.
    pub handle: String,
    /// Display name shown to administrators.
    pub display_name: String,
    /// Kind of journey this flow defines.
    pub flow_type: FlowType,
    /// Version number currently served as the live definition.
    pub active_version: i32,
    /// Timestamp when the flow was created.
    pub created_at: OffsetDateTime,
    /// Timestamp when the flow was last updated.
    pub updated_at: OffsetDateTime,
}

/// Data for creating a new flow.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = flows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFlow {
    /// Flow identifier, generated by the caller.
    pub id: Uuid,
    /// Handle slug.
    pub handle: String,
    /// Display name.
    pub display_name: String,
    /// Flow type.
    pub flow_type: FlowType,
    /// Initial active version, always 1.
    pub active_version: i32,
}

impl NewFlow {
    /// Creates insert data for a flow with a fresh time-ordered identifier.
    pub fn new(handle: impl Into<String>, display_name: impl Into<String>, flow_type: FlowType) -> Self {
        Self {
            id: Uuid::now_v7(),
            handle: handle.into(),
            display_name: display_name.into(),
            flow_type,
            active_version: 1,
        }
    }
}

/// Data for updating a flow row.
///
/// Only the display name and the active-version pointer are mutable;
/// `handle` and `flow_type` have no changeset fields on purpose.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = flows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateFlow {
    /// New display name.
    pub display_name: Option<String>,
    /// New active version pointer.
    pub active_version: Option<i32>,
    /// Update timestamp.
    pub updated_at: Option<OffsetDateTime>,
}

impl Flow {
    /// Returns whether the given version number is the active one.
    #[inline]
    pub fn is_active_version(&self, version: i32) -> bool {
        self.active_version == version
    }

    /// Returns whether this flow has ever been updated.
    #[inline]
    pub fn is_initial_version(&self) -> bool {
        self.active_version == 1
    }
}

/// A flow together with the decoded node list of its active version.
///
/// This is what the store hands out on reads: the metadata row plus the
/// definition content, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    /// Flow metadata.
    pub flow: Flow,
    /// Decoded node list of the active version.
    pub nodes: Vec<NodeDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flow_starts_at_version_one() {
        let new_flow = NewFlow::new("login", "Login", FlowType::Authentication);
        assert_eq!(new_flow.active_version, 1);
        assert_eq!(new_flow.id.get_version(), Some(uuid::Version::SortRand));
    }
}
