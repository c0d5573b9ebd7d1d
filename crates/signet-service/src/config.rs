//! Flow management service configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default number of retained versions per flow.
pub const DEFAULT_VERSION_HISTORY: i32 = 10;

/// Hard ceiling on retained versions per flow.
pub const MAX_VERSION_HISTORY: i32 = 50;

/// Default page size for flow listings.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum page size for flow listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Policy configuration for the flow management service.
///
/// Injected explicitly into [`FlowService`]; there is no global accessor.
///
/// [`FlowService`]: crate::FlowService
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct FlowConfig {
    /// Maximum retained versions per flow.
    ///
    /// Values of zero or below resolve to the built-in default; values above
    /// the hard ceiling are clamped to it.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "flow-max-version-history",
            env = "FLOW_MAX_VERSION_HISTORY",
            default_value = "10"
        )
    )]
    #[serde(default = "default_version_history")]
    pub max_version_history: i32,

    /// Whether creating an authentication flow also infers and persists a
    /// registration companion flow.
    #[cfg_attr(
        feature = "config",
        arg(long = "flow-auto-infer-registration", env = "FLOW_AUTO_INFER_REGISTRATION")
    )]
    #[serde(default)]
    pub auto_infer_registration: bool,

    /// Whether declarative flow creation is permitted.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "flow-declarative-create",
            env = "FLOW_DECLARATIVE_CREATE",
            action = clap::ArgAction::Set,
            default_value_t = true
        )
    )]
    #[serde(default = "default_enabled")]
    pub declarative_create: bool,

    /// Whether declarative flow updates (and restores) are permitted.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "flow-declarative-update",
            env = "FLOW_DECLARATIVE_UPDATE",
            action = clap::ArgAction::Set,
            default_value_t = true
        )
    )]
    #[serde(default = "default_enabled")]
    pub declarative_update: bool,

    /// Whether declarative flow deletion is permitted.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "flow-declarative-delete",
            env = "FLOW_DECLARATIVE_DELETE",
            action = clap::ArgAction::Set,
            default_value_t = true
        )
    )]
    #[serde(default = "default_enabled")]
    pub declarative_delete: bool,

    /// Page size used when a listing passes no usable limit.
    #[cfg_attr(
        feature = "config",
        arg(long = "flow-default-page-size", env = "FLOW_DEFAULT_PAGE_SIZE", default_value = "25")
    )]
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Largest page size a listing may request.
    #[cfg_attr(
        feature = "config",
        arg(long = "flow-max-page-size", env = "FLOW_MAX_PAGE_SIZE", default_value = "100")
    )]
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

fn default_version_history() -> i32 {
    DEFAULT_VERSION_HISTORY
}

fn default_enabled() -> bool {
    true
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> i64 {
    MAX_PAGE_SIZE
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_version_history: DEFAULT_VERSION_HISTORY,
            auto_infer_registration: false,
            declarative_create: true,
            declarative_update: true,
            declarative_delete: true,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl FlowConfig {
    /// Resolves the retained-version bound: non-positive values fall back to
    /// the default, values above the ceiling are clamped to it.
    pub fn version_history(&self) -> i64 {
        let resolved = if self.max_version_history <= 0 {
            DEFAULT_VERSION_HISTORY
        } else {
            self.max_version_history.min(MAX_VERSION_HISTORY)
        };
        i64::from(resolved)
    }

    /// Clamps a requested page limit into `(0, max_page_size]`, substituting
    /// the default when the request is not positive.
    pub fn clamp_limit(&self, limit: i64) -> i64 {
        if limit <= 0 {
            self.default_page_size
        } else {
            limit.min(self.max_page_size)
        }
    }

    /// Clamps a requested offset to be non-negative.
    pub fn clamp_offset(&self, offset: i64) -> i64 {
        offset.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_history_resolution() {
        let mut config = FlowConfig::default();
        assert_eq!(config.version_history(), 10);

        config.max_version_history = 0;
        assert_eq!(config.version_history(), i64::from(DEFAULT_VERSION_HISTORY));

        config.max_version_history = -3;
        assert_eq!(config.version_history(), i64::from(DEFAULT_VERSION_HISTORY));

        config.max_version_history = 5;
        assert_eq!(config.version_history(), 5);

        config.max_version_history = 500;
        assert_eq!(config.version_history(), i64::from(MAX_VERSION_HISTORY));
    }

    #[test]
    fn limit_clamping() {
        let config = FlowConfig::default();
        assert_eq!(config.clamp_limit(0), DEFAULT_PAGE_SIZE);
        assert_eq!(config.clamp_limit(-10), DEFAULT_PAGE_SIZE);
        assert_eq!(config.clamp_limit(40), 40);
        assert_eq!(config.clamp_limit(10_000), MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_clamping() {
        let config = FlowConfig::default();
        assert_eq!(config.clamp_offset(-1), 0);
        assert_eq!(config.clamp_offset(30), 30);
    }
}
