//! Shared error type across promexp crates.

use thiserror::Error;

/// Stable error codes (used in HTTP error bodies and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid metric/label name, empty label value, bad ttl.
    Validation,
    /// Non-numeric metric value.
    Type,
    /// Unknown metric type.
    Lookup,
    /// The metric provider failed or timed out.
    Provider,
    /// Unreadable or malformed config.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::Type => "TYPE",
            ErrorCode::Lookup => "LOOKUP",
            ErrorCode::Provider => "PROVIDER",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("provider failed: {0}")]
    Provider(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ExporterError::Validation(_) => ErrorCode::Validation,
            ExporterError::Type(_) => ErrorCode::Type,
            ExporterError::Lookup(_) => ErrorCode::Lookup,
            ExporterError::Provider(_) => ErrorCode::Provider,
            ExporterError::Config(_) => ErrorCode::Config,
            ExporterError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the caller (rather than the exporter) caused this error.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ExporterError::Validation(_) | ExporterError::Type(_) | ExporterError::Lookup(_)
        )
    }
}
