//! Executor registry for flow compilation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::{NodeDef, NodeKind};
use crate::error::{FlowError, FlowResult};
use crate::TRACING_TARGET_REGISTRY;

/// A named unit of execution logic a `TASK_EXECUTION` node delegates to.
///
/// Implementations live outside this subsystem (credential validators,
/// social-login connectors, OTP senders); the registry only needs their name
/// and default display metadata.
pub trait Executor: Send + Sync {
    /// Registry name of this executor.
    fn name(&self) -> &str;

    /// Default display metadata applied to nodes that declare none.
    fn default_meta(&self) -> Option<serde_json::Value> {
        None
    }
}

/// In-memory executor registry.
///
/// Stores executors by name for lookup during metadata defaulting and graph
/// compilation.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an executor under its own name, replacing any previous
    /// executor with the same name.
    pub fn register<E>(&mut self, executor: E)
    where
        E: Executor + 'static,
    {
        let name = executor.name().to_owned();
        tracing::debug!(target: TRACING_TARGET_REGISTRY, executor = %name, "Registered executor");
        self.executors.insert(name, Arc::new(executor));
    }

    /// Resolves an executor by name.
    pub fn resolve(&self, name: &str) -> FlowResult<Arc<dyn Executor>> {
        self.executors
            .get(name)
            .cloned()
            .ok_or_else(|| FlowError::UnknownExecutor(name.to_owned()))
    }

    /// Returns whether an executor with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Lists all registered executor names.
    pub fn names(&self) -> Vec<&str> {
        self.executors.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("executors", &self.executors.keys())
            .finish()
    }
}

/// Applies executor default metadata to execution nodes that declare none.
///
/// Nodes of other kinds and execution nodes with explicit metadata are left
/// untouched. Fails when a referenced executor is not registered; execution
/// nodes without any executor reference are left for the compiler to reject.
pub fn apply_default_meta(nodes: &mut [NodeDef], registry: &ExecutorRegistry) -> FlowResult<()> {
    for node in nodes.iter_mut() {
        if node.kind != NodeKind::TaskExecution || node.meta.is_some() {
            continue;
        }
        let Some(executor_ref) = &node.executor else {
            continue;
        };

        let executor = registry.resolve(&executor_ref.name)?;
        if let Some(meta) = executor.default_meta() {
            tracing::debug!(
                target: TRACING_TARGET_REGISTRY,
                node_id = %node.id,
                executor = %executor_ref.name,
                "Applied executor default metadata"
            );
            node.meta = Some(meta);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::definition::ExecutorRef;

    struct PasswordValidator;

    impl Executor for PasswordValidator {
        fn name(&self) -> &str {
            "password-validator"
        }

        fn default_meta(&self) -> Option<serde_json::Value> {
            Some(json!({"icon": "lock"}))
        }
    }

    struct OtpSender;

    impl Executor for OtpSender {
        fn name(&self) -> &str {
            "otp-sender"
        }
    }

    fn registry() -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::new();
        registry.register(PasswordValidator);
        registry.register(OtpSender);
        registry
    }

    #[test]
    fn resolve_known_and_unknown() {
        let registry = registry();
        assert!(registry.resolve("password-validator").is_ok());
        assert!(matches!(
            registry.resolve("magic-link"),
            Err(FlowError::UnknownExecutor(name)) if name == "magic-link"
        ));
    }

    #[test]
    fn defaults_fill_only_empty_execution_meta() {
        let registry = registry();
        let mut nodes = vec![
            NodeDef::new("start", NodeKind::Start),
            NodeDef::new("check", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("password-validator")),
            NodeDef::new("custom", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("password-validator"))
                .with_meta(json!({"icon": "key"})),
            NodeDef::new("otp", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("otp-sender")),
        ];

        apply_default_meta(&mut nodes, &registry).unwrap();

        assert_eq!(nodes[1].meta, Some(json!({"icon": "lock"})));
        // Explicit metadata wins over the executor default.
        assert_eq!(nodes[2].meta, Some(json!({"icon": "key"})));
        // Executor without default metadata leaves the node bare.
        assert_eq!(nodes[3].meta, None);
    }

    #[test]
    fn defaults_fail_on_unknown_executor() {
        let registry = registry();
        let mut nodes = vec![
            NodeDef::new("check", NodeKind::TaskExecution)
                .with_executor(ExecutorRef::new("magic-link")),
        ];

        let err = apply_default_meta(&mut nodes, &registry).unwrap_err();
        assert!(matches!(err, FlowError::UnknownExecutor(_)));
    }
}
