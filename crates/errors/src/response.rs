use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Coarse outcome class of a failed request; maps 1:1 onto an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    Internal,
}

impl StatusCategory {
    pub fn status_code(self) -> u16 {
        match self {
            StatusCategory::BadRequest => 400,
            StatusCategory::Unauthorized => 401,
            StatusCategory::Forbidden => 403,
            StatusCategory::NotFound => 404,
            StatusCategory::Conflict => 409,
            StatusCategory::UnprocessableEntity => 422,
            StatusCategory::Internal => 500,
        }
    }

    pub fn is_client_error(self) -> bool {
        self != StatusCategory::Internal
    }
}

/// Client-facing error body.
///
/// Never carries stack traces, credentials or raw internal messages; handlers
/// decide exactly which text leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedErrorResponse {
    pub status: StatusCategory,
    pub error: Cow<'static, str>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ComposedErrorResponse {
    pub fn new(
        status: StatusCategory,
        error: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// Generic body used when no handler claims a failure.
    pub fn internal_error() -> Self {
        Self::new(StatusCategory::Internal, "internal_error", "internal error")
    }
}
