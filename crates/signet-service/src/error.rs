//! Common error type definitions.

use thiserror::Error;

/// Tracing target for error mapping.
const TRACING_TARGET: &str = "signet_service::error";

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source slot of [`Error`], wrapping any underlying failure
/// while keeping storage-engine detail out of the public message.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur in flow management operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The submitted definition or argument is invalid.
    Validation,
    /// A flow with the same `(handle, flow_type)` already exists.
    Conflict,
    /// The referenced flow does not exist.
    FlowNotFound,
    /// The flow exists, but the referenced version does not.
    VersionNotFound,
    /// The operation is administratively disabled.
    PolicyDenied,
    /// Internal service error; detail is logged, never surfaced.
    Internal,
}

/// A structured error type for flow management operations.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation).with_message(message)
    }

    /// Creates a new duplicate-handle conflict error.
    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    /// Creates a new flow-not-found error.
    pub fn flow_not_found() -> Self {
        Self::new(ErrorKind::FlowNotFound)
    }

    /// Creates a new version-not-found error.
    pub fn version_not_found() -> Self {
        Self::new(ErrorKind::VersionNotFound)
    }

    /// Creates a new policy-denied error with the given message.
    pub fn policy_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyDenied).with_message(message)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error was caused by the caller (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Validation
                | ErrorKind::Conflict
                | ErrorKind::FlowNotFound
                | ErrorKind::VersionNotFound
                | ErrorKind::PolicyDenied
        )
    }

    /// Returns true if this is an internal failure (5xx equivalent).
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, ErrorKind::Internal)
    }
}

impl From<signet_postgres::PgError> for Error {
    fn from(error: signet_postgres::PgError) -> Self {
        // The unique constraint backstops the duplicate-handle check under
        // concurrent creation; surface it as the conflict it is.
        if error
            .constraint_violation()
            .is_some_and(|violation| violation.is_duplicate_handle())
        {
            return Error::conflict()
                .with_message("flow handle already exists for this flow type")
                .with_source(error);
        }

        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            "Flow store operation failed"
        );
        Error::internal().with_source(error)
    }
}

impl From<signet_flow::FlowError> for Error {
    fn from(error: signet_flow::FlowError) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            "Flow graph operation failed"
        );
        Error::internal().with_source(error)
    }
}

impl From<diesel::result::Error> for Error {
    fn from(error: diesel::result::Error) -> Self {
        Error::from(signet_postgres::PgError::from(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Error::validation("bad handle").is_client_error());
        assert!(Error::conflict().is_client_error());
        assert!(Error::flow_not_found().is_client_error());
        assert!(Error::internal().is_internal());
        assert!(!Error::internal().is_client_error());
    }

    #[test]
    fn not_found_kinds_stay_distinct() {
        assert_ne!(Error::flow_not_found().kind(), Error::version_not_found().kind());
    }

    #[test]
    fn display_includes_message() {
        let error = Error::validation("flow name must not be empty");
        assert_eq!(error.to_string(), "Validation: flow name must not be empty");
    }
}
