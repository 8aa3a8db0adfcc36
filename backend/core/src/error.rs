use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the statusgate service.
///
/// Every per-request variant is turned into a JSON `{error}` body at the HTTP
/// edge; only `ConfigError` is fatal, and only at startup. Dependency
/// failures are a separate type ([`DependencyUnavailable`]) with no HTTP
/// mapping.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("admission denied: {message}")]
    AdmissionDenied {
        message: String,
        retry_after: Duration,
    },

    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    /// Whether this error must abort the process rather than a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GateError::ConfigError(_))
    }
}

/// A backing dependency could not be reached. Recovered into report data
/// (`database: disconnected`), never returned from a handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("dependency unavailable: {dependency}: {reason}")]
pub struct DependencyUnavailable {
    pub dependency: String,
    pub reason: String,
}

impl DependencyUnavailable {
    pub fn new(dependency: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(GateError::ConfigError("no secret".into()).is_fatal());
        assert!(!GateError::AdmissionDenied {
            message: "window full".into(),
            retry_after: Duration::from_secs(1),
        }
        .is_fatal());
        assert!(!GateError::AuthenticationFailure("bad key".into()).is_fatal());
    }

    #[test]
    fn display_includes_category() {
        let err = GateError::AuthenticationFailure("Invalid token".into());
        assert_eq!(err.to_string(), "authentication failed: Invalid token");

        let err = DependencyUnavailable::new("mysql", "connection refused");
        assert_eq!(err.to_string(), "dependency unavailable: mysql: connection refused");
    }
}
