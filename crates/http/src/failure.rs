//! The single failure signal raised for a rejected request.

use compliance_core::FieldErrors;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Summary used when a failure carries no messages at all.
pub const GENERIC_FAILURE_MESSAGE: &str = "The given data was invalid.";

/// A rejected request: field-keyed errors plus the response status.
///
/// Displays as the first message, followed by a count of the rest:
///
/// ```
/// use compliance_http::ValidationFailure;
/// use http::StatusCode;
///
/// let mut errors = compliance_core::FieldErrors::new();
/// errors.insert("age".into(), vec!["Must be at least 18".into(), "Too young".into()]);
///
/// let failure = ValidationFailure::new(errors, StatusCode::UNPROCESSABLE_ENTITY);
/// assert_eq!(failure.to_string(), "Must be at least 18 (and 1 more error)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationFailure {
    errors: FieldErrors,
    status: StatusCode,
}

impl ValidationFailure {
    /// Create a failure.
    #[must_use]
    pub fn new(errors: FieldErrors, status: StatusCode) -> Self {
        Self { errors, status }
    }

    /// Field-keyed messages, in insertion order.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Summary message (same as `Display`).
    #[must_use]
    pub fn message(&self) -> String {
        summarize(&self.errors)
    }

    /// Consume into the error map.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// JSON response body: `{"message": ..., "errors": {...}}`.
    #[must_use]
    pub fn body(&self) -> FailureBody<'_> {
        FailureBody {
            message: self.message(),
            errors: &self.errors,
        }
    }
}

/// Serializable response body of a [`ValidationFailure`].
#[derive(Debug, Serialize)]
pub struct FailureBody<'a> {
    /// Summary message.
    pub message: String,
    /// Field-keyed messages.
    pub errors: &'a FieldErrors,
}

fn summarize(errors: &FieldErrors) -> String {
    let mut messages = errors.values().flatten();
    let Some(first) = messages.next() else {
        return GENERIC_FAILURE_MESSAGE.to_string();
    };

    match messages.count() {
        0 => first.clone(),
        1 => format!("{first} (and 1 more error)"),
        more => format!("{first} (and {more} more errors)"),
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ValidationFailure {
    fn into_response(self) -> axum::response::Response {
        (self.status, axum::Json(self.body())).into_response()
    }
}
