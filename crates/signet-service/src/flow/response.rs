//! Response types for flow management operations.

use signet_postgres::model::Flow;

use crate::pagination::PageLinks;

/// One page of flow summaries with navigation links.
#[derive(Debug, Clone)]
pub struct FlowPage {
    /// Flow metadata rows of this page.
    pub items: Vec<Flow>,
    /// Total number of flows matching the filter.
    pub total: i64,
    /// Navigation links for the surrounding pages.
    pub links: PageLinks,
}
