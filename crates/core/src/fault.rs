//! Rule-internal faults.
//!
//! A fault is a rule failing to run, not a rule finding bad data. Faults
//! never leave the chain: each one is downgraded to a single message under
//! the faulting rule's key.

use thiserror::Error;

/// Something went wrong inside a rule's `validate`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleFault {
    /// A field the rule depends on is not in the payload.
    #[error("missing field `{0}`")]
    MissingField(String),

    /// A field holds a value of the wrong JSON type.
    #[error("field `{field}` is not {expected}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected JSON type, e.g. "an integer".
        expected: &'static str,
    },

    /// The rule panicked.
    #[error("rule panicked: {0}")]
    Panicked(String),

    /// Free-form failure description.
    #[error("{0}")]
    Message(String),

    /// Failure raised by code the rule calls into.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RuleFault {
    /// Create a free-form fault.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Create a missing-field fault.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a type-mismatch fault.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
        }
    }

    /// Wrap any error raised by a dependency.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }

    /// Describe a panic payload caught at the rule boundary.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let description = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(description)
    }
}

impl From<serde_json::Error> for RuleFault {
    fn from(error: serde_json::Error) -> Self {
        Self::other(error)
    }
}

/// Result of a rule's `validate`.
pub type RuleResult = Result<(), RuleFault>;
