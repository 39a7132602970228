//! The mutable carrier threaded through one rule chain run.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Request data a chain validates: merged body and route parameters.
pub type Payload = Map<String, Value>;

/// Field-keyed error messages in first-recorded order.
///
/// Keys keep the order in which their first message was recorded; messages
/// under a key keep the order in which they were recorded.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Pipeline state for a single validation pass.
///
/// Created per pass, owned by the runner while rules execute and consumed
/// once the outcome is built. Request data lives in [`payload`](Self::payload);
/// bookkeeping (errors, the stop flag, a declared status) lives beside it and
/// never leaks into the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleContext {
    payload: Payload,
    errors: FieldErrors,
    must_stop: bool,
    status: Option<u16>,
}

impl RuleContext {
    /// Create a context seeded with request data.
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Request data.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Whether a rule asked for the rest of the chain to be skipped.
    #[must_use]
    pub fn must_stop(&self) -> bool {
        self.must_stop
    }

    /// Status code declared by a rule, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether no error has been recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of recorded messages across all keys.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Split into the payload, the errors and the declared status.
    #[must_use]
    pub fn into_parts(self) -> (Payload, FieldErrors, Option<u16>) {
        (self.payload, self.errors, self.status)
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Append one message under `key`. Existing messages are never removed.
    pub(crate) fn push_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    pub(crate) fn stop(&mut self) {
        self.must_stop = true;
    }

    /// Record a status code. The first declaration wins.
    pub(crate) fn declare_status(&mut self, status: u16) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        true
    }
}
