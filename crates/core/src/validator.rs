//! Entry point: run a rule list over a payload and summarise the outcome.

use tracing::debug;

use crate::config::ComplianceConfig;
use crate::context::{Payload, RuleContext};
use crate::registry::{RegistryError, RuleRegistry};
use crate::result::ComplianceResult;
use crate::rule::SharedRule;
use crate::runner::RuleChainRunner;

/// Runs compliance chains and builds [`ComplianceResult`]s.
///
/// Each call builds a fresh context; nothing is cached or retried.
///
/// # Examples
///
/// ```
/// use compliance_core::{ComplianceValidator, rule_fn};
/// use serde_json::json;
///
/// let min_age = rule_fn("age", "Must be at least 18", |scope| {
///     if scope.require_i64("age")? < 18 {
///         scope.invalidate(None, None);
///     }
///     Ok(())
/// });
///
/// let validator = ComplianceValidator::default();
/// let payload = json!({"age": 15}).as_object().cloned().unwrap();
/// let result = validator.validate(&payload, &[min_age]);
///
/// assert!(!result.is_valid());
/// assert_eq!(result.message(), "Must be at least 18");
/// assert_eq!(result.code(), Some(422));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComplianceValidator {
    runner: RuleChainRunner,
}

impl ComplianceValidator {
    /// Create a validator with the given configuration.
    #[must_use]
    pub fn new(config: ComplianceConfig) -> Self {
        Self {
            runner: RuleChainRunner::new(config),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ComplianceConfig {
        self.runner.config()
    }

    /// Run `rules` over a copy of `payload`.
    pub fn validate(&self, payload: &Payload, rules: &[SharedRule]) -> ComplianceResult {
        self.validate_owned(payload.clone(), rules)
    }

    /// Run `rules` over `payload`, taking ownership of it.
    pub fn validate_owned(&self, payload: Payload, rules: &[SharedRule]) -> ComplianceResult {
        let context = self.runner.run(RuleContext::new(payload), rules);
        self.summarise(context)
    }

    /// Resolve rule identifiers through `registry`, then validate.
    ///
    /// Resolution happens before any rule runs; an unknown identifier
    /// returns an error and no rule is executed.
    pub fn validate_ids<I, S>(
        &self,
        payload: &Payload,
        ids: I,
        registry: &RuleRegistry,
    ) -> Result<ComplianceResult, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = registry.resolve_all(ids)?;
        Ok(self.validate(payload, &rules))
    }

    fn summarise(&self, context: RuleContext) -> ComplianceResult {
        let (_, errors, status) = context.into_parts();

        if errors.is_empty() {
            return ComplianceResult::valid();
        }

        let code = status.unwrap_or(self.config().default_status);
        let result = ComplianceResult::from_errors(errors, code);
        debug!(
            code,
            fields = result.errors().len(),
            message = result.message(),
            "compliance validation failed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::rule_fn;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_rule_list_is_valid() {
        let result = ComplianceValidator::default().validate(&payload(json!({"x": 1})), &[]);
        assert_eq!(result, ComplianceResult::valid());
    }

    #[test]
    fn default_status_applies_without_declaration() {
        let rule = rule_fn("x", "bad", |scope| {
            scope.invalidate(None, None);
            Ok(())
        });
        let result = ComplianceValidator::new(ComplianceConfig::default().with_default_status(400))
            .validate(&payload(json!({})), &[rule]);
        assert_eq!(result.code(), Some(400));
    }

    #[test]
    fn declared_status_overrides_default() {
        let rule = rule_fn("x", "forbidden", |scope| {
            scope.set_status(403);
            scope.invalidate(None, None);
            Ok(())
        });
        let result = ComplianceValidator::default().validate(&payload(json!({})), &[rule]);
        assert_eq!(result.code(), Some(403));
    }

    #[test]
    fn declared_status_without_errors_stays_valid() {
        let rule = rule_fn("x", "unused", |scope| {
            scope.set_status(403);
            Ok(())
        });
        let result = ComplianceValidator::default().validate(&payload(json!({})), &[rule]);
        assert!(result.is_valid());
        assert_eq!(result.code(), None);
    }

    #[test]
    fn caller_payload_is_not_mutated() {
        let rule = rule_fn("x", "unused", |scope| {
            scope.payload_mut().insert("injected".into(), json!(true));
            Ok(())
        });
        let data = payload(json!({"x": 1}));
        let _ = ComplianceValidator::default().validate(&data, &[rule]);
        assert!(!data.contains_key("injected"));
    }
}
