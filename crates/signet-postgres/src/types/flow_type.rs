//! Flow type enumeration for the kinds of user journeys.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Defines the kind of user journey a flow describes.
///
/// This enumeration corresponds to the `FLOW_TYPE` PostgreSQL enum. A handle
/// is unique within one flow type, so the same handle may name both an
/// authentication flow and its registration companion.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::FlowType"]
pub enum FlowType {
    /// Signs an existing user in.
    #[db_rename = "authentication"]
    #[serde(rename = "authentication")]
    #[strum(serialize = "authentication")]
    Authentication,

    /// Registers a new user.
    #[db_rename = "registration"]
    #[serde(rename = "registration")]
    #[strum(serialize = "registration")]
    Registration,

    /// Walks a freshly registered user through first-time setup.
    #[db_rename = "user_onboarding"]
    #[serde(rename = "user_onboarding")]
    #[strum(serialize = "user_onboarding")]
    UserOnboarding,
}

impl FlowType {
    /// Returns whether this is an authentication flow.
    #[inline]
    pub fn is_authentication(self) -> bool {
        matches!(self, FlowType::Authentication)
    }

    /// Returns whether this is a registration flow.
    #[inline]
    pub fn is_registration(self) -> bool {
        matches!(self, FlowType::Registration)
    }

    /// Returns whether a registration companion can be inferred from a flow
    /// of this type.
    #[inline]
    pub fn supports_registration_inference(self) -> bool {
        matches!(self, FlowType::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!(
            FlowType::from_str("authentication").unwrap(),
            FlowType::Authentication
        );
        assert_eq!(
            FlowType::from_str("user_onboarding").unwrap(),
            FlowType::UserOnboarding
        );
        assert!(FlowType::from_str("AUTHENTICATION").is_err());
        assert!(FlowType::from_str("password_recovery").is_err());
    }

    #[test]
    fn displays_wire_names() {
        assert_eq!(FlowType::Registration.to_string(), "registration");
    }
}
