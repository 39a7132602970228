//! Outcome of a compliance run.

use serde::Serialize;

use crate::context::FieldErrors;

/// Immutable summary of one chain run.
///
/// `is_valid()` is true exactly when `errors()` is empty. An invalid result
/// always carries a status code and its message is the first message of the
/// first failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    #[serde(rename = "valid")]
    is_valid: bool,
    message: String,
    code: Option<u16>,
    errors: FieldErrors,
}

impl ComplianceResult {
    /// A passing result: no message, no errors, no status code.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
            code: None,
            errors: FieldErrors::new(),
        }
    }

    /// Build a result from collected errors.
    ///
    /// Empty `errors` yields [`valid`](Self::valid) regardless of `code`.
    /// Keys without messages are dropped so the message invariant holds.
    #[must_use]
    pub fn from_errors(mut errors: FieldErrors, code: u16) -> Self {
        errors.retain(|_, messages| !messages.is_empty());

        let Some(message) = errors.values().next().and_then(|m| m.first()).cloned() else {
            return Self::valid();
        };

        Self {
            is_valid: false,
            message,
            code: Some(code),
            errors,
        }
    }

    /// Whether every rule passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// First recorded message; empty when valid.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status code; `None` when valid, leaving the default to the caller.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// All recorded messages by field.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Take ownership of the error map.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

impl Default for ComplianceResult {
    fn default() -> Self {
        Self::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn errors(pairs: &[(&str, &[&str])]) -> FieldErrors {
        pairs
            .iter()
            .map(|(k, msgs)| {
                (
                    (*k).to_string(),
                    msgs.iter().map(|m| (*m).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn valid_has_no_message_or_code() {
        let result = ComplianceResult::valid();
        assert!(result.is_valid());
        assert_eq!(result.message(), "");
        assert_eq!(result.code(), None);
        assert!(result.errors().is_empty());
    }

    #[test]
    fn message_is_first_message_of_first_key() {
        let result = ComplianceResult::from_errors(
            errors(&[("b", &["b1", "b2"]), ("a", &["a1"])]),
            422,
        );
        assert!(!result.is_valid());
        assert_eq!(result.message(), "b1");
        assert_eq!(result.code(), Some(422));
        assert_eq!(result.errors_for("b"), ["b1", "b2"]);
        assert!(result.errors_for("missing").is_empty());
    }

    #[test]
    fn empty_errors_are_valid() {
        let result = ComplianceResult::from_errors(FieldErrors::new(), 409);
        assert_eq!(result, ComplianceResult::valid());
    }

    #[test]
    fn keys_without_messages_are_dropped() {
        let result = ComplianceResult::from_errors(errors(&[("a", &[]), ("b", &["b1"])]), 422);
        assert_eq!(result.message(), "b1");
        assert!(!result.errors().contains_key("a"));

        let result = ComplianceResult::from_errors(errors(&[("a", &[])]), 422);
        assert!(result.is_valid());
    }

    #[test]
    fn serializes_as_json() {
        let result = ComplianceResult::from_errors(errors(&[("age", &["Too young"])]), 422);
        insta::assert_json_snapshot!(result, @r#"
        {
          "valid": false,
          "message": "Too young",
          "code": 422,
          "errors": {
            "age": [
              "Too young"
            ]
          }
        }
        "#);
    }
}
