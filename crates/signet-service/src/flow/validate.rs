//! Validation rules for administrator-authored flow definitions.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use signet_postgres::types::FlowType;

use super::request::FlowDefinition;
use crate::error::{Error, Result};

/// Handle grammar: lowercase letters and digits, with `_`/`-` allowed
/// between them. A single character is a valid handle; separators must not
/// lead or trail.
static HANDLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9_-]*[a-z0-9])?$").expect("handle pattern must compile")
});

/// Validates a flow definition before any store interaction.
pub(crate) fn validate_definition(definition: &FlowDefinition) -> Result<()> {
    if definition.handle.is_empty() {
        return Err(Error::validation("flow handle must not be empty"));
    }
    if !HANDLE_PATTERN.is_match(&definition.handle) {
        return Err(Error::validation(format!(
            "flow handle {:?} must be a lowercase slug",
            definition.handle
        )));
    }
    if definition.display_name.trim().is_empty() {
        return Err(Error::validation("flow name must not be empty"));
    }

    // A start and an end marker alone are not a journey: two nodes is a
    // distinct error from having fewer than two.
    match definition.nodes.len() {
        0..2 => Err(Error::validation(
            "flow must contain at least a start and an end node",
        )),
        2 => Err(Error::validation(
            "flow must contain at least one node between start and end",
        )),
        _ => Ok(()),
    }
}

/// Parses a flow-type filter string, rejecting unknown values.
pub(crate) fn parse_flow_type(raw: &str) -> Result<FlowType> {
    FlowType::from_str(raw)
        .map_err(|_| Error::validation(format!("unknown flow type {raw:?}")))
}

#[cfg(test)]
mod tests {
    use signet_flow::{NodeDef, NodeKind};

    use super::*;

    fn definition(handle: &str, name: &str, node_count: usize) -> FlowDefinition {
        let mut nodes = Vec::new();
        if node_count > 0 {
            nodes.push(NodeDef::new("start", NodeKind::Start));
        }
        for i in 1..node_count.saturating_sub(1) {
            nodes.push(NodeDef::new(format!("step-{i}"), NodeKind::Prompt));
        }
        if node_count > 1 {
            nodes.push(NodeDef::new("done", NodeKind::End));
        }
        FlowDefinition::new(handle, name, FlowType::Authentication, nodes)
    }

    #[test]
    fn accepts_valid_handles() {
        for handle in ["a", "ab-c_1", "login-form", "0", "x2"] {
            assert!(
                validate_definition(&definition(handle, "Login", 3)).is_ok(),
                "{handle:?} should be accepted"
            );
        }
    }

    #[test]
    fn rejects_invalid_handles() {
        for handle in ["", "Abc", "-abc", "abc-", "ab c", "_x", "x_", "hä"] {
            let err = validate_definition(&definition(handle, "Login", 3)).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Validation, "{handle:?}");
        }
    }

    #[test]
    fn rejects_empty_name() {
        let err = validate_definition(&definition("login", "  ", 3)).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn rejects_too_few_nodes_with_distinct_messages() {
        let too_few = validate_definition(&definition("login", "Login", 1)).unwrap_err();
        let none = validate_definition(&definition("login", "Login", 0)).unwrap_err();
        let only_markers = validate_definition(&definition("login", "Login", 2)).unwrap_err();

        assert_eq!(too_few.to_string(), none.to_string());
        assert_ne!(only_markers.to_string(), too_few.to_string());
        assert!(validate_definition(&definition("login", "Login", 3)).is_ok());
    }

    #[test]
    fn parses_flow_type_filters() {
        assert_eq!(
            parse_flow_type("registration").unwrap(),
            FlowType::Registration
        );
        assert!(parse_flow_type("mfa").is_err());
    }
}
