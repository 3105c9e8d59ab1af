//! Form pipeline error taxonomy.
//!
//! Validation messages are specific (which field, what format); security
//! and configuration classes stay generic on the wire, details go to the
//! logs only.

use serde::Serialize;
use thiserror::Error;

/// One invalid field in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Field name as submitted (e.g. "email").
    pub field: String,
    /// What is wrong and what format is expected.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Semicolon-joined field messages for `Display`.
fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Terminal failure of one submission.
#[derive(Error, Debug)]
pub enum FormError {
    /// User input malformed; recoverable by the user, surfaced verbatim.
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Too many attempts; recoverable after a wait.
    #[error("rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Seconds remaining in the window.
        retry_after_seconds: u64,
    },

    /// Upstream transient failure; surfaced as "try again shortly".
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Credentials or permissions broken; the wire message never carries
    /// the detail.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FormError {
    /// HTTP status the fronting endpoint should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::RateLimitExceeded { .. } => 429,
            Self::ServiceUnavailable(_) => 503,
            Self::Configuration(_) => 500,
        }
    }

    /// Wire body for the fronting endpoint.
    #[must_use]
    pub fn response_body(&self) -> ErrorBody {
        match self {
            Self::Validation(fields) => ErrorBody {
                error: fields
                    .first()
                    .map_or_else(|| "Invalid submission".to_string(), |f| f.message.clone()),
                message: None,
                retry_after: None,
            },
            Self::RateLimitExceeded { retry_after_seconds } => ErrorBody {
                error: "Too many submissions. Please try again later.".to_string(),
                message: None,
                retry_after: Some(*retry_after_seconds),
            },
            Self::ServiceUnavailable(_) => ErrorBody {
                error: "Service temporarily unavailable".to_string(),
                message: Some("Please try again shortly.".to_string()),
                retry_after: None,
            },
            Self::Configuration(_) => ErrorBody {
                error: "Something went wrong".to_string(),
                message: Some("Please contact support.".to_string()),
                retry_after: None,
            },
        }
    }
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Short user-facing error.
    pub error: String,
    /// Optional longer hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Seconds to wait before retrying (429 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
