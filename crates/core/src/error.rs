//! Domain error model.

use serde::Serialize;
use thiserror::Error;
use warden_errors::{Failure, FailureType};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending input field, as the client sent it.
    pub field: String,
    /// Machine-readable reason (e.g. `"length"`, `"format"`).
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.code)
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. The
/// `Display` text is for logs only; client-facing bodies are built by the
/// error composer, which never echoes these strings for token or email
/// failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A single-use code did not match, was never issued, was already used,
    /// or has expired. Callers cannot tell these cases apart.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// The requested email already belongs to another account.
    #[error("email unavailable")]
    DuplicateEmail,

    /// The acting party may not perform this action.
    #[error("forbidden")]
    Forbidden,

    /// One or more input fields failed validation.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Unexpected failure (lock poisoning, broken collaborator, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, code)])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the end user can recover by retrying with fresh input
    /// (e.g. requesting a new code).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidOrExpiredToken | Self::DuplicateEmail | Self::Validation(_)
        )
    }
}

/// Failure type names under which [`DomainError`] variants are dispatched.
pub mod failure_types {
    use warden_errors::FailureType;

    pub const FAILURE: FailureType = FailureType::from_static("failure");
    pub const ACCOUNT: FailureType = FailureType::from_static("account");
    pub const VALIDATION: FailureType = FailureType::from_static("validation");
    pub const DUPLICATE_EMAIL: FailureType = FailureType::from_static("duplicate_email");
    pub const INVALID_OR_EXPIRED_TOKEN: FailureType =
        FailureType::from_static("invalid_or_expired_token");
    pub const FORBIDDEN: FailureType = FailureType::from_static("forbidden");
    pub const NOT_FOUND: FailureType = FailureType::from_static("not_found");
    pub const INTERNAL: FailureType = FailureType::from_static("internal");
}

impl Failure for DomainError {
    fn failure_type(&self) -> FailureType {
        match self {
            Self::InvalidOrExpiredToken => failure_types::INVALID_OR_EXPIRED_TOKEN,
            Self::DuplicateEmail => failure_types::DUPLICATE_EMAIL,
            Self::Forbidden => failure_types::FORBIDDEN,
            Self::Validation(_) => failure_types::VALIDATION,
            Self::NotFound => failure_types::NOT_FOUND,
            Self::Internal(_) => failure_types::INTERNAL,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
