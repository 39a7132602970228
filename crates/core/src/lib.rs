#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # compliance-core
//!
//! Ordered chains of compliance rules run against one request payload.
//!
//! Each rule reads the payload, may record field-keyed error messages and
//! may stop the rest of the chain. A rule that fails to run is downgraded
//! to a single message under its key, so a run always ends with a
//! [`ComplianceResult`] and never with a propagated fault.
//!
//! - [`RuleContext`]: payload, accumulated errors, stop flag
//! - [`ComplianceRule`] / [`RuleHandler`]: the rule contract and its
//!   chain entry point
//! - [`RuleChainRunner`]: sequential execution
//! - [`ComplianceValidator`] / [`ComplianceResult`]: entry point and outcome
//! - [`RuleRegistry`]: identifier → rule resolution
//! - [`compliance_rule!`]: declare rules without boilerplate
//!
//! ## Quick Start
//!
//! ```
//! use compliance_core::prelude::*;
//! use serde_json::json;
//!
//! let min_age = rule_fn("age", "Must be at least 18", |scope| {
//!     if scope.require_i64("age")? < 18 {
//!         scope.invalidate(None, None);
//!     }
//!     Ok(())
//! });
//!
//! let payload = json!({"age": 21}).as_object().cloned().unwrap();
//! let result = ComplianceValidator::default().validate(&payload, &[min_age]);
//! assert!(result.is_valid());
//! ```

pub mod config;
pub mod context;
pub mod fault;
mod macros;
pub mod prelude;
pub mod registry;
pub mod result;
pub mod rule;
pub mod runner;
pub mod validator;

pub use config::{ComplianceConfig, DEFAULT_FAULT_MESSAGE, DEFAULT_FAULT_PREFIX, DEFAULT_STATUS};
pub use context::{FieldErrors, Payload, RuleContext};
pub use fault::{RuleFault, RuleResult};
pub use registry::{RegistryError, RuleRegistry};
pub use result::ComplianceResult;
pub use rule::{
    ComplianceRule, DEFAULT_KEY, DEFAULT_MESSAGE, FnRule, Next, RuleHandler, RuleScope,
    SharedRule, rule_fn,
};
pub use runner::RuleChainRunner;
pub use validator::ComplianceValidator;
