//! Prelude module for convenient imports.
//!
//! `use compliance_core::prelude::*;` brings in everything needed to write
//! rules and run them.

pub use crate::compliance_rule;
pub use crate::config::ComplianceConfig;
pub use crate::context::{FieldErrors, Payload, RuleContext};
pub use crate::fault::{RuleFault, RuleResult};
pub use crate::registry::{RegistryError, RuleRegistry};
pub use crate::result::ComplianceResult;
pub use crate::rule::{ComplianceRule, FnRule, RuleHandler, RuleScope, SharedRule, rule_fn};
pub use crate::validator::ComplianceValidator;
