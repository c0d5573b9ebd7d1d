//! Registration-flow inference.
//!
//! Creating an authentication flow can also provision the registration
//! journey for the same handle: the handle is unique per flow type, so the
//! companion reuses it under `flow_type = registration`. The node list is
//! carried over as authored; executors that verify a credential during
//! sign-in enroll it during sign-up.

use signet_postgres::types::FlowType;

use super::request::FlowDefinition;

/// Derives the registration companion of an authentication flow.
///
/// Returns `None` for flow types no companion can be inferred from.
pub(crate) fn infer_registration(definition: &FlowDefinition) -> Option<FlowDefinition> {
    if !definition.flow_type.supports_registration_inference() {
        return None;
    }

    Some(FlowDefinition {
        handle: definition.handle.clone(),
        display_name: definition.display_name.clone(),
        flow_type: FlowType::Registration,
        nodes: definition.nodes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use signet_flow::{ExecutorRef, NodeDef, NodeKind};

    use super::*;

    fn login_definition(flow_type: FlowType) -> FlowDefinition {
        FlowDefinition::new(
            "login-form",
            "Login",
            flow_type,
            vec![
                NodeDef::new("start", NodeKind::Start).with_next("check"),
                NodeDef::new("check", NodeKind::TaskExecution)
                    .with_executor(ExecutorRef::new("password-validator"))
                    .with_next("done"),
                NodeDef::new("done", NodeKind::End),
            ],
        )
    }

    #[test]
    fn infers_companion_from_authentication() {
        let definition = login_definition(FlowType::Authentication);
        let companion = infer_registration(&definition).unwrap();

        assert_eq!(companion.flow_type, FlowType::Registration);
        assert_eq!(companion.handle, definition.handle);
        assert_eq!(companion.nodes, definition.nodes);
    }

    #[test]
    fn only_authentication_flows_infer() {
        assert!(infer_registration(&login_definition(FlowType::Registration)).is_none());
        assert!(infer_registration(&login_definition(FlowType::UserOnboarding)).is_none());
    }
}
