//! Flow repository for managing flow table operations.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use signet_flow::NodeDef;
use time::OffsetDateTime;
use uuid::Uuid;

use super::FlowVersionRepository;
use crate::model::{Flow, FlowRecord, NewFlow, NewFlowVersion, UpdateFlow};
use crate::types::{FlowType, OffsetPage, OffsetPagination};
use crate::{PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for flow table operations.
///
/// Multi-row writes (create, update, restore) assume the caller already
/// opened a transaction; the row write order within them is what keeps a
/// failed write from corrupting the active version.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowRepository;

impl FlowRepository {
    /// Creates a new flow repository instance.
    pub fn new() -> Self {
        Self
    }

    /// Lists flow metadata rows with a total count, optionally filtered by
    /// flow type. The caller is responsible for clamping the pagination.
    pub async fn list_flows(
        conn: &mut AsyncPgConnection,
        pagination: OffsetPagination,
        flow_type: Option<FlowType>,
    ) -> PgResult<OffsetPage<Flow>> {
        use schema::flows::{self, dsl};

        let mut query = flows::table.select(Flow::as_select()).into_boxed();
        if let Some(flow_type) = flow_type {
            query = query.filter(dsl::flow_type.eq(flow_type));
        }

        let items = query
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(conn)
            .await
            .map_err(PgError::from)?;

        let total = match flow_type {
            Some(flow_type) => {
                flows::table
                    .filter(dsl::flow_type.eq(flow_type))
                    .count()
                    .get_result::<i64>(conn)
                    .await
            }
            None => flows::table.count().get_result::<i64>(conn).await,
        }
        .map_err(PgError::from)?;

        Ok(OffsetPage::new(items, total))
    }

    /// Creates a flow together with its first version.
    ///
    /// The flow row starts at `active_version = 1` and the node list is
    /// persisted as version 1. Uniqueness of `(handle, flow_type)` is
    /// enforced by the database constraint; no pre-check happens here.
    pub async fn create_flow(
        conn: &mut AsyncPgConnection,
        new_flow: NewFlow,
        nodes: &[NodeDef],
    ) -> PgResult<FlowRecord> {
        use schema::flows;

        let first_version = NewFlowVersion::encode(new_flow.id, new_flow.active_version, nodes)?;

        let flow: Flow = diesel::insert_into(flows::table)
            .values(&new_flow)
            .returning(Flow::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)?;

        FlowVersionRepository::create_version(conn, first_version).await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            flow_id = %flow.id,
            handle = %flow.handle,
            flow_type = %flow.flow_type,
            "Created flow with initial version"
        );

        Ok(FlowRecord {
            flow,
            nodes: nodes.to_vec(),
        })
    }

    /// Finds a flow by id, including the decoded nodes of its active version.
    pub async fn find_flow_by_id(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
    ) -> PgResult<Option<FlowRecord>> {
        use schema::flows::{self, dsl};

        let flow = flows::table
            .filter(dsl::id.eq(flow_id))
            .select(Flow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        match flow {
            Some(flow) => Self::load_record(conn, flow).await.map(Some),
            None => Ok(None),
        }
    }

    /// Finds a flow by its `(handle, flow_type)` pair.
    pub async fn find_flow_by_handle(
        conn: &mut AsyncPgConnection,
        handle: &str,
        flow_type: FlowType,
    ) -> PgResult<Option<FlowRecord>> {
        use schema::flows::{self, dsl};

        let flow = flows::table
            .filter(dsl::handle.eq(handle))
            .filter(dsl::flow_type.eq(flow_type))
            .select(Flow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        match flow {
            Some(flow) => Self::load_record(conn, flow).await.map(Some),
            None => Ok(None),
        }
    }

    /// Updates a flow by appending a new version and advancing the pointer.
    ///
    /// The version row is written before the flow row is touched, so a
    /// failure part-way leaves the previously active version intact. History
    /// eviction runs last, inside the same transaction. Returns `None` if
    /// the flow does not exist.
    pub async fn update_flow(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        display_name: &str,
        nodes: &[NodeDef],
        max_history: i64,
    ) -> PgResult<Option<FlowRecord>> {
        let Some(flow) = Self::find_flow_row(conn, flow_id).await? else {
            return Ok(None);
        };

        let next_version = flow.active_version + 1;
        let new_version = NewFlowVersion::encode(flow_id, next_version, nodes)?;
        FlowVersionRepository::create_version(conn, new_version).await?;

        let flow = Self::advance_flow_row(
            conn,
            flow_id,
            UpdateFlow {
                display_name: Some(display_name.to_owned()),
                active_version: Some(next_version),
                updated_at: Some(OffsetDateTime::now_utc()),
            },
        )
        .await?;
        FlowVersionRepository::evict_oldest(conn, flow_id, max_history).await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            flow_id = %flow_id,
            active_version = next_version,
            "Updated flow to new version"
        );

        Ok(Some(FlowRecord {
            flow,
            nodes: nodes.to_vec(),
        }))
    }

    /// Restores an earlier version by copying its content forward.
    ///
    /// The target version's stored payload is written under a fresh version
    /// number and the pointer advances, in the same order as
    /// [`update_flow`](Self::update_flow); the original version row is left
    /// untouched. Returns `None` if the flow or the version does not exist.
    pub async fn restore_flow_version(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        version: i32,
        max_history: i64,
    ) -> PgResult<Option<FlowRecord>> {
        let Some(flow) = Self::find_flow_row(conn, flow_id).await? else {
            return Ok(None);
        };
        let Some(target) =
            FlowVersionRepository::find_version_by_number(conn, flow_id, version).await?
        else {
            return Ok(None);
        };

        let next_version = flow.active_version + 1;
        let restored = NewFlowVersion::new(flow_id, next_version, target.nodes.clone());
        FlowVersionRepository::create_version(conn, restored).await?;

        let flow = Self::advance_flow_row(
            conn,
            flow_id,
            UpdateFlow {
                display_name: None,
                active_version: Some(next_version),
                updated_at: Some(OffsetDateTime::now_utc()),
            },
        )
        .await?;
        FlowVersionRepository::evict_oldest(conn, flow_id, max_history).await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            flow_id = %flow_id,
            restored_version = version,
            active_version = next_version,
            "Restored flow version as new active version"
        );

        let nodes = target.decode_nodes()?;
        Ok(Some(FlowRecord { flow, nodes }))
    }

    /// Deletes a flow; version rows follow through the cascading foreign key.
    ///
    /// Deleting an id that never existed is a no-op-shaped success.
    pub async fn delete_flow(conn: &mut AsyncPgConnection, flow_id: Uuid) -> PgResult<bool> {
        use schema::flows::{self, dsl};

        let deleted = diesel::delete(flows::table.filter(dsl::id.eq(flow_id)))
            .execute(conn)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    /// Returns whether a flow with the given id exists.
    pub async fn flow_exists(conn: &mut AsyncPgConnection, flow_id: Uuid) -> PgResult<bool> {
        use schema::flows::{self, dsl};

        diesel::select(diesel::dsl::exists(
            flows::table.filter(dsl::id.eq(flow_id)),
        ))
        .get_result(conn)
        .await
        .map_err(PgError::from)
    }

    /// Returns whether a flow with the given `(handle, flow_type)` exists.
    pub async fn flow_exists_by_handle(
        conn: &mut AsyncPgConnection,
        handle: &str,
        flow_type: FlowType,
    ) -> PgResult<bool> {
        use schema::flows::{self, dsl};

        diesel::select(diesel::dsl::exists(
            flows::table
                .filter(dsl::handle.eq(handle))
                .filter(dsl::flow_type.eq(flow_type)),
        ))
        .get_result(conn)
        .await
        .map_err(PgError::from)
    }

    /// Loads the bare flow row without its nodes.
    async fn find_flow_row(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
    ) -> PgResult<Option<Flow>> {
        use schema::flows::{self, dsl};

        flows::table
            .filter(dsl::id.eq(flow_id))
            .select(Flow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Applies a changeset to the flow row.
    async fn advance_flow_row(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        changes: UpdateFlow,
    ) -> PgResult<Flow> {
        use schema::flows::{self, dsl};

        diesel::update(flows::table.filter(dsl::id.eq(flow_id)))
            .set(&changes)
            .returning(Flow::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Joins a flow row with the decoded nodes of its active version.
    async fn load_record(conn: &mut AsyncPgConnection, flow: Flow) -> PgResult<FlowRecord> {
        let version =
            FlowVersionRepository::find_version_by_number(conn, flow.id, flow.active_version)
                .await?
                .ok_or_else(|| {
                    PgError::Unexpected(
                        format!(
                            "active version {} of flow {} has no version row",
                            flow.active_version, flow.id
                        )
                        .into(),
                    )
                })?;

        let nodes = version.decode_nodes()?;
        Ok(FlowRecord { flow, nodes })
    }
}
