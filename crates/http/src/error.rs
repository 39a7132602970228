//! Errors raised while building the adapter.

use compliance_core::RegistryError;
use thiserror::Error;

/// Adapter construction errors.
///
/// These are configuration problems found at startup, never request
/// outcomes; a rejected request is a [`ValidationFailure`](crate::ValidationFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AdapterError {
    /// The configured default status is not a valid HTTP status code.
    #[error("invalid default status code: {0}")]
    InvalidStatus(u16),

    /// A route names a rule the registry cannot resolve.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
