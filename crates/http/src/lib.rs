#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # compliance-http
//!
//! Request-side glue for [`compliance_core`] chains.
//!
//! - [`RuleRoutes`] / [`RouteConfig`]: rule lists per HTTP verb
//! - [`ComplianceRequest`]: payload assembly, native and compliance
//!   validation, a single [`ValidationFailure`]
//! - [`merge_errors`]: compliance messages ahead of native ones
//!
//! With the `axum` feature, [`ValidationFailure`] is an `IntoResponse`
//! rendering `{"message": ..., "errors": {...}}` with its status.
//!
//! ## Quick Start
//!
//! ```
//! use compliance_core::rule_fn;
//! use compliance_http::{ComplianceRequest, NoFieldRules, RuleRoutes};
//! use http::{Method, StatusCode};
//! use serde_json::json;
//!
//! let min_age = rule_fn("age", "Must be at least 18", |scope| {
//!     if scope.require_i64("age")? < 18 {
//!         scope.invalidate(None, None);
//!     }
//!     Ok(())
//! });
//!
//! let request = ComplianceRequest::new(RuleRoutes::new().post([min_age]));
//! let body = json!({"age": 15}).as_object().cloned().unwrap();
//!
//! let failure = request
//!     .validate_resolved(&Method::POST, body, [("user", 7)], &NoFieldRules)
//!     .unwrap_err();
//! assert_eq!(failure.status(), StatusCode::UNPROCESSABLE_ENTITY);
//! assert_eq!(failure.to_string(), "Must be at least 18");
//! ```

pub mod error;
pub mod failure;
pub mod merge;
pub mod request;
pub mod routes;

pub use error::AdapterError;
pub use failure::{FailureBody, GENERIC_FAILURE_MESSAGE, ValidationFailure};
pub use merge::merge_errors;
pub use request::{AdapterConfig, ComplianceRequest, FieldValidator, NoFieldRules};
pub use routes::{RouteConfig, RuleRoutes};
