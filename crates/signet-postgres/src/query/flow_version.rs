//! Flow version repository for managing version table operations.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::model::{FlowVersion, NewFlowVersion};
use crate::{PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for flow version table operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowVersionRepository;

impl FlowVersionRepository {
    /// Creates a new flow version repository instance.
    pub fn new() -> Self {
        Self
    }

    /// Inserts a new flow version row.
    pub async fn create_version(
        conn: &mut AsyncPgConnection,
        new_version: NewFlowVersion,
    ) -> PgResult<FlowVersion> {
        use schema::flow_versions;

        diesel::insert_into(flow_versions::table)
            .values(&new_version)
            .returning(FlowVersion::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Lists retained versions for a flow, newest first.
    pub async fn list_flow_versions(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
    ) -> PgResult<Vec<FlowVersion>> {
        use schema::flow_versions::{self, dsl};

        flow_versions::table
            .filter(dsl::flow_id.eq(flow_id))
            .order(dsl::version.desc())
            .select(FlowVersion::as_select())
            .load(conn)
            .await
            .map_err(PgError::from)
    }

    /// Finds a specific version by flow id and version number.
    pub async fn find_version_by_number(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        version: i32,
    ) -> PgResult<Option<FlowVersion>> {
        use schema::flow_versions::{self, dsl};

        flow_versions::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::version.eq(version))
            .select(FlowVersion::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Counts retained versions for a flow.
    pub async fn count_versions(conn: &mut AsyncPgConnection, flow_id: Uuid) -> PgResult<i64> {
        use schema::flow_versions::{self, dsl};

        flow_versions::table
            .filter(dsl::flow_id.eq(flow_id))
            .count()
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Evicts the single lowest-numbered retained version when the retained
    /// count exceeds `max_history`.
    ///
    /// Runs inside the caller's transaction, immediately after a version
    /// insert, so the history bound holds after every successful write.
    /// Version numbers are never renumbered; eviction leaves gaps behind.
    pub async fn evict_oldest(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        max_history: i64,
    ) -> PgResult<Option<i32>> {
        use schema::flow_versions::{self, dsl};

        let retained = Self::count_versions(conn, flow_id).await?;
        if retained <= max_history {
            return Ok(None);
        }

        let oldest = flow_versions::table
            .filter(dsl::flow_id.eq(flow_id))
            .select(diesel::dsl::min(dsl::version))
            .first::<Option<i32>>(conn)
            .await
            .map_err(PgError::from)?;

        let Some(oldest) = oldest else {
            return Ok(None);
        };

        diesel::delete(
            flow_versions::table
                .filter(dsl::flow_id.eq(flow_id))
                .filter(dsl::version.eq(oldest)),
        )
        .execute(conn)
        .await
        .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            flow_id = %flow_id,
            evicted_version = oldest,
            retained = retained - 1,
            "Evicted oldest retained flow version"
        );

        Ok(Some(oldest))
    }
}
