//! Database constraint violations for the flow tables.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Category of a constraint violation, used to pick an error mapping.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// A uniqueness constraint was violated (conflict).
    Uniqueness,
    /// A value failed a validation check constraint.
    Validation,
    /// A referential integrity constraint was violated.
    Referential,
}

/// Flows table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum FlowConstraints {
    /// Duplicate `(handle, flow_type)` pair.
    #[strum(serialize = "flows_handle_flow_type_key")]
    HandleFlowTypeKey,
    /// Handle does not match the slug grammar.
    #[strum(serialize = "flows_handle_format")]
    HandleFormat,
    /// Active version pointer must stay positive.
    #[strum(serialize = "flows_active_version_positive")]
    ActiveVersionPositive,
}

impl FlowConstraints {
    /// Creates a new [`FlowConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            FlowConstraints::HandleFlowTypeKey => ConstraintCategory::Uniqueness,
            FlowConstraints::HandleFormat | FlowConstraints::ActiveVersionPositive => {
                ConstraintCategory::Validation
            }
        }
    }
}

/// Flow versions table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum FlowVersionConstraints {
    /// Duplicate `(flow_id, version)` pair.
    #[strum(serialize = "flow_versions_flow_id_version_key")]
    FlowIdVersionKey,
    /// Version row references a missing flow.
    #[strum(serialize = "flow_versions_flow_id_fkey")]
    FlowIdFkey,
    /// Version numbers must stay positive.
    #[strum(serialize = "flow_versions_version_positive")]
    VersionPositive,
}

impl FlowVersionConstraints {
    /// Creates a new [`FlowVersionConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            FlowVersionConstraints::FlowIdVersionKey => ConstraintCategory::Uniqueness,
            FlowVersionConstraints::FlowIdFkey => ConstraintCategory::Referential,
            FlowVersionConstraints::VersionPositive => ConstraintCategory::Validation,
        }
    }
}

/// Unified constraint violation enum covering both flow tables.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConstraintViolation {
    /// Violation on the `flows` table.
    Flow(FlowConstraints),
    /// Violation on the `flow_versions` table.
    FlowVersion(FlowVersionConstraints),
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        if let Some(flow) = FlowConstraints::new(constraint) {
            return Some(Self::Flow(flow));
        }

        FlowVersionConstraints::new(constraint).map(Self::FlowVersion)
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Flow(constraint) => constraint.categorize(),
            ConstraintViolation::FlowVersion(constraint) => constraint.categorize(),
        }
    }

    /// Returns whether this violation is the duplicate-handle conflict.
    pub fn is_duplicate_handle(&self) -> bool {
        matches!(
            self,
            ConstraintViolation::Flow(FlowConstraints::HandleFlowTypeKey)
        )
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Flow(constraint) => constraint.fmt(f),
            ConstraintViolation::FlowVersion(constraint) => constraint.fmt(f),
        }
    }
}

impl From<FlowConstraints> for String {
    #[inline]
    fn from(val: FlowConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for FlowConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FlowVersionConstraints> for String {
    #[inline]
    fn from(val: FlowVersionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for FlowVersionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_constraints() {
        let violation = ConstraintViolation::new("flows_handle_flow_type_key").unwrap();
        assert!(violation.is_duplicate_handle());
        assert_eq!(violation.categorize(), ConstraintCategory::Uniqueness);

        let violation = ConstraintViolation::new("flow_versions_flow_id_fkey").unwrap();
        assert_eq!(violation.categorize(), ConstraintCategory::Referential);
    }

    #[test]
    fn unknown_constraint_is_none() {
        assert!(ConstraintViolation::new("documents_display_name_length").is_none());
    }
}
