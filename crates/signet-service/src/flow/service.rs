//! Flow management service.

use std::sync::Arc;

use diesel_async::scoped_futures::ScopedFutureExt;
use signet_flow::{CompiledGraph, GraphBuilder, apply_default_meta};
use signet_postgres::model::{FlowRecord, FlowVersion, NewFlow};
use signet_postgres::query::{FlowRepository, FlowVersionRepository};
use signet_postgres::types::{FlowType, OffsetPagination};
use signet_postgres::{PgClient, PgConn};
use uuid::Uuid;

use super::request::FlowDefinition;
use super::response::FlowPage;
use super::{infer, validate};
use crate::config::FlowConfig;
use crate::error::{Error, Result};
use crate::pagination::build_links;
use crate::TRACING_TARGET_FLOW;

/// The flow management service.
///
/// The single entry point for every flow operation a transport layer may
/// perform. Owns validation, policy gating, transaction orchestration,
/// version-lifecycle policy and graph-cache invalidation; persistence
/// mechanics live in the store, compilation in the graph builder.
///
/// Cloning is cheap; all clones share the pool, the cache and the registry.
#[derive(Debug, Clone)]
pub struct FlowService {
    db: PgClient,
    graphs: GraphBuilder,
    config: FlowConfig,
}

impl FlowService {
    /// Creates a new flow service.
    pub fn new(db: PgClient, graphs: GraphBuilder, config: FlowConfig) -> Self {
        Self { db, graphs, config }
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Lists flows with a total count and navigation links.
    ///
    /// `limit` is clamped into `(0, max_page_size]` (defaulting when not
    /// positive), `offset` is floored at zero, and an unknown `flow_type`
    /// filter is rejected.
    pub async fn list_flows(
        &self,
        limit: i64,
        offset: i64,
        flow_type: Option<&str>,
    ) -> Result<FlowPage> {
        let flow_type = flow_type.map(validate::parse_flow_type).transpose()?;
        let limit = self.config.clamp_limit(limit);
        let offset = self.config.clamp_offset(offset);

        let mut conn = self.db.get_connection().await?;
        let page = conn
            .transaction(|conn| {
                async move {
                    FlowRepository::list_flows(conn, OffsetPagination::new(limit, offset), flow_type)
                        .await
                        .map_err(Error::from)
                }
                .scope_boxed()
            })
            .await?;

        let links = build_links(limit, offset, page.total);
        Ok(FlowPage {
            total: page.total,
            items: page.items,
            links,
        })
    }

    /// Creates a flow and, for authentication flows, best-effort infers a
    /// registration companion when enabled.
    #[tracing::instrument(skip_all, fields(handle = %definition.handle, flow_type = %definition.flow_type))]
    pub async fn create_flow(&self, definition: FlowDefinition) -> Result<FlowRecord> {
        if !self.config.declarative_create {
            return Err(Error::policy_denied(
                "flow creation is administratively disabled",
            ));
        }
        validate::validate_definition(&definition)?;

        let companion = self
            .config
            .auto_infer_registration
            .then(|| infer::infer_registration(&definition))
            .flatten();

        let mut conn = self.db.get_connection().await?;
        let record = self.persist_flow(&mut conn, definition).await?;

        tracing::info!(
            target: TRACING_TARGET_FLOW,
            flow_id = %record.flow.id,
            handle = %record.flow.handle,
            "Flow created"
        );

        // The companion is written after the primary transaction committed;
        // its failure is logged and never escalates.
        if let Some(companion) = companion {
            match self.persist_flow(&mut conn, companion).await {
                Ok(inferred) => {
                    tracing::info!(
                        target: TRACING_TARGET_FLOW,
                        flow_id = %inferred.flow.id,
                        source_flow_id = %record.flow.id,
                        "Inferred registration flow created"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_FLOW,
                        source_flow_id = %record.flow.id,
                        error = %error,
                        "Registration flow inference failed"
                    );
                }
            }
        }

        Ok(record)
    }

    /// Returns a flow with the decoded nodes of its active version.
    pub async fn get_flow(&self, flow_id: Uuid) -> Result<FlowRecord> {
        ensure_flow_id(flow_id)?;

        let mut conn = self.db.get_connection().await?;
        conn.transaction(|conn| {
            async move {
                FlowRepository::find_flow_by_id(conn, flow_id)
                    .await?
                    .ok_or_else(Error::flow_not_found)
            }
            .scope_boxed()
        })
        .await
    }

    /// Returns a flow addressed by its `(handle, flow_type)` pair.
    pub async fn get_flow_by_handle(
        &self,
        handle: &str,
        flow_type: FlowType,
    ) -> Result<FlowRecord> {
        if handle.is_empty() {
            return Err(Error::validation("flow handle must not be empty"));
        }

        let handle = handle.to_owned();
        let mut conn = self.db.get_connection().await?;
        conn.transaction(|conn| {
            async move {
                FlowRepository::find_flow_by_handle(conn, &handle, flow_type)
                    .await?
                    .ok_or_else(Error::flow_not_found)
            }
            .scope_boxed()
        })
        .await
    }

    /// Updates a flow, appending a new version and advancing the pointer.
    ///
    /// `handle` and `flow_type` are immutable; an attempt to change either
    /// is rejected with its own error before anything is written. On
    /// success the flow's cached graph is dropped.
    #[tracing::instrument(skip_all, fields(flow_id = %flow_id))]
    pub async fn update_flow(
        &self,
        flow_id: Uuid,
        definition: FlowDefinition,
    ) -> Result<FlowRecord> {
        if !self.config.declarative_update {
            return Err(Error::policy_denied(
                "flow updates are administratively disabled",
            ));
        }
        ensure_flow_id(flow_id)?;
        validate::validate_definition(&definition)?;

        let registry = self.graphs.registry().clone();
        let max_history = self.config.version_history();
        let FlowDefinition {
            handle,
            display_name,
            flow_type,
            mut nodes,
        } = definition;

        let mut conn = self.db.get_connection().await?;
        let record = conn
            .transaction(|conn| {
                async move {
                    let Some(existing) = FlowRepository::find_flow_by_id(conn, flow_id).await?
                    else {
                        return Err(Error::flow_not_found());
                    };
                    if existing.flow.handle != handle {
                        return Err(Error::validation(
                            "flow handle is immutable and cannot be changed",
                        ));
                    }
                    if existing.flow.flow_type != flow_type {
                        return Err(Error::validation(
                            "flow type is immutable and cannot be changed",
                        ));
                    }

                    apply_default_meta(&mut nodes, &registry)?;
                    FlowRepository::update_flow(conn, flow_id, &display_name, &nodes, max_history)
                        .await?
                        .ok_or_else(Error::flow_not_found)
                }
                .scope_boxed()
            })
            .await?;

        self.graphs.invalidate(flow_id);
        tracing::info!(
            target: TRACING_TARGET_FLOW,
            flow_id = %flow_id,
            active_version = record.flow.active_version,
            "Flow updated"
        );

        Ok(record)
    }

    /// Deletes a flow and its versions.
    ///
    /// Deleting an id that does not exist is a silent success, so repeated
    /// declarative applies stay idempotent.
    #[tracing::instrument(skip_all, fields(flow_id = %flow_id))]
    pub async fn delete_flow(&self, flow_id: Uuid) -> Result<()> {
        if !self.config.declarative_delete {
            return Err(Error::policy_denied(
                "flow deletion is administratively disabled",
            ));
        }
        ensure_flow_id(flow_id)?;

        let mut conn = self.db.get_connection().await?;
        let deleted = FlowRepository::delete_flow(&mut conn, flow_id).await?;

        if deleted {
            self.graphs.invalidate(flow_id);
            tracing::info!(target: TRACING_TARGET_FLOW, flow_id = %flow_id, "Flow deleted");
        } else {
            tracing::debug!(
                target: TRACING_TARGET_FLOW,
                flow_id = %flow_id,
                "Delete of absent flow treated as success"
            );
        }

        Ok(())
    }

    /// Lists the retained versions of a flow, newest first.
    pub async fn list_flow_versions(&self, flow_id: Uuid) -> Result<Vec<FlowVersion>> {
        ensure_flow_id(flow_id)?;

        let mut conn = self.db.get_connection().await?;
        conn.transaction(|conn| {
            async move {
                if !FlowRepository::flow_exists(conn, flow_id).await? {
                    return Err(Error::flow_not_found());
                }
                FlowVersionRepository::list_flow_versions(conn, flow_id)
                    .await
                    .map_err(Error::from)
            }
            .scope_boxed()
        })
        .await
    }

    /// Returns a specific version of a flow, content included.
    ///
    /// A missing flow and a missing version of an existing flow are
    /// distinct errors.
    pub async fn get_flow_version(&self, flow_id: Uuid, version: i32) -> Result<FlowVersion> {
        ensure_flow_id(flow_id)?;
        ensure_version_number(version)?;

        let mut conn = self.db.get_connection().await?;
        conn.transaction(|conn| {
            async move {
                if !FlowRepository::flow_exists(conn, flow_id).await? {
                    return Err(Error::flow_not_found());
                }
                FlowVersionRepository::find_version_by_number(conn, flow_id, version)
                    .await?
                    .ok_or_else(Error::version_not_found)
            }
            .scope_boxed()
        })
        .await
    }

    /// Restores an earlier version by copying its content forward under a
    /// fresh version number.
    #[tracing::instrument(skip_all, fields(flow_id = %flow_id, version = version))]
    pub async fn restore_flow_version(&self, flow_id: Uuid, version: i32) -> Result<FlowRecord> {
        if !self.config.declarative_update {
            return Err(Error::policy_denied(
                "flow updates are administratively disabled",
            ));
        }
        ensure_flow_id(flow_id)?;
        ensure_version_number(version)?;

        let max_history = self.config.version_history();
        let mut conn = self.db.get_connection().await?;
        let record = conn
            .transaction(|conn| {
                async move {
                    if !FlowRepository::flow_exists(conn, flow_id).await? {
                        return Err(Error::flow_not_found());
                    }
                    FlowRepository::restore_flow_version(conn, flow_id, version, max_history)
                        .await?
                        .ok_or_else(Error::version_not_found)
                }
                .scope_boxed()
            })
            .await?;

        self.graphs.invalidate(flow_id);
        tracing::info!(
            target: TRACING_TARGET_FLOW,
            flow_id = %flow_id,
            restored_version = version,
            active_version = record.flow.active_version,
            "Flow version restored"
        );

        Ok(record)
    }

    /// Returns the compiled graph of a flow's active version.
    pub async fn get_graph(&self, flow_id: Uuid) -> Result<Arc<CompiledGraph>> {
        let record = self.get_flow(flow_id).await?;
        self.graphs
            .graph(record.flow.id, &record.nodes)
            .map_err(Error::from)
    }

    /// Returns whether a flow exists, treating every failure as "no".
    pub async fn is_valid_flow(&self, flow_id: Uuid) -> bool {
        match self.probe_flow(flow_id).await {
            Ok(exists) => exists,
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET_FLOW,
                    flow_id = %flow_id,
                    error = %error,
                    "Treating flow lookup failure as invalid"
                );
                false
            }
        }
    }

    async fn probe_flow(&self, flow_id: Uuid) -> Result<bool> {
        ensure_flow_id(flow_id)?;
        let mut conn = self.db.get_connection().await?;
        FlowRepository::flow_exists(&mut conn, flow_id)
            .await
            .map_err(Error::from)
    }

    /// Persists one flow definition inside its own transaction: uniqueness
    /// check, executor metadata defaults, insert of the flow row and its
    /// first version.
    async fn persist_flow(
        &self,
        conn: &mut PgConn,
        definition: FlowDefinition,
    ) -> Result<FlowRecord> {
        let registry = self.graphs.registry().clone();
        let FlowDefinition {
            handle,
            display_name,
            flow_type,
            mut nodes,
        } = definition;

        conn.transaction(|conn| {
            async move {
                if FlowRepository::flow_exists_by_handle(conn, &handle, flow_type).await? {
                    return Err(Error::conflict().with_message(format!(
                        "flow {handle:?} already exists for type {flow_type}"
                    )));
                }

                apply_default_meta(&mut nodes, &registry)?;
                let new_flow = NewFlow::new(handle, display_name, flow_type);
                FlowRepository::create_flow(conn, new_flow, &nodes)
                    .await
                    .map_err(Error::from)
            }
            .scope_boxed()
        })
        .await
    }
}

/// Rejects the nil UUID, the typed equivalent of an empty id input.
fn ensure_flow_id(flow_id: Uuid) -> Result<()> {
    if flow_id.is_nil() {
        return Err(Error::validation("flow id must not be empty"));
    }
    Ok(())
}

/// Version numbers start at one.
fn ensure_version_number(version: i32) -> Result<()> {
    if version < 1 {
        return Err(Error::validation(
            "flow version must be a positive integer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use signet_flow::{ExecutorRegistry, GraphBuilder, NodeDef, NodeKind};
    use signet_postgres::PgConfig;

    use super::*;
    use crate::ErrorKind;

    /// A service over a pool that never connects; only paths that fail
    /// before the first store round-trip are exercised here.
    fn service(config: FlowConfig) -> FlowService {
        let db = PgClient::new(PgConfig::new("postgresql://signet@localhost/signet-test"))
            .expect("pool construction is lazy");
        let graphs = GraphBuilder::new(std::sync::Arc::new(ExecutorRegistry::new()));
        FlowService::new(db, graphs, config)
    }

    fn login_definition() -> FlowDefinition {
        FlowDefinition::new(
            "login-form",
            "Login",
            signet_postgres::types::FlowType::Authentication,
            vec![
                NodeDef::new("start", NodeKind::Start).with_next("ask"),
                NodeDef::new("ask", NodeKind::Prompt).with_next("done"),
                NodeDef::new("done", NodeKind::End),
            ],
        )
    }

    #[tokio::test]
    async fn create_respects_policy_toggle() {
        let service = service(FlowConfig {
            declarative_create: false,
            ..FlowConfig::default()
        });

        let err = service.create_flow(login_definition()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyDenied);
    }

    #[tokio::test]
    async fn update_and_delete_respect_policy_toggles() {
        let service = service(FlowConfig {
            declarative_update: false,
            declarative_delete: false,
            ..FlowConfig::default()
        });
        let flow_id = Uuid::now_v7();

        let err = service
            .update_flow(flow_id, login_definition())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyDenied);

        let err = service.delete_flow(flow_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyDenied);

        let err = service.restore_flow_version(flow_id, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyDenied);
    }

    #[tokio::test]
    async fn create_validates_before_persisting() {
        let service = service(FlowConfig::default());

        let mut definition = login_definition();
        definition.handle = "Login-Form".into();
        let err = service.create_flow(definition).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut definition = login_definition();
        definition.nodes.truncate(2);
        let err = service.create_flow(definition).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn nil_ids_and_bad_versions_are_rejected() {
        let service = service(FlowConfig::default());

        let err = service.get_flow(Uuid::nil()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .get_flow_version(Uuid::now_v7(), 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .get_flow_by_handle("", signet_postgres::types::FlowType::Authentication)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn unknown_list_filter_is_rejected() {
        let service = service(FlowConfig::default());
        let err = service
            .list_flows(10, 0, Some("password_recovery"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn nil_flow_is_never_valid() {
        let service = service(FlowConfig::default());
        assert!(!service.is_valid_flow(Uuid::nil()).await);
    }
}
