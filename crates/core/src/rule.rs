//! The rule contract and the continuation that drives a chain.
//!
//! A rule implements [`ComplianceRule::validate`] and, through the
//! [`RuleScope`] it is handed, reads the payload and records errors. The
//! chain itself is driven by [`RuleHandler::handle`], provided for every
//! rule: it honours the stop flag, contains faults and always hands the
//! context on to [`Next`].

use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{trace, warn};

use crate::config::ComplianceConfig;
use crate::context::{FieldErrors, Payload, RuleContext};
use crate::fault::{RuleFault, RuleResult};

/// Key used when a rule declares none.
pub const DEFAULT_KEY: &str = "Some attribute";

/// Message used when a rule declares none.
pub const DEFAULT_MESSAGE: &str = "Some data is invalid";

/// A rule shared between rule lists, registries and threads.
pub type SharedRule = Arc<dyn ComplianceRule>;

// ============================================================================
// RULE CONTRACT
// ============================================================================

/// One self-contained compliance check.
///
/// Implementors provide [`validate`](Self::validate) and usually override
/// [`key`](Self::key) and [`message`](Self::message) so that a bare
/// [`RuleScope::invalidate`] records something meaningful.
///
/// # Examples
///
/// ```
/// use compliance_core::{ComplianceRule, RuleResult, RuleScope};
///
/// struct MinAge(i64);
///
/// impl ComplianceRule for MinAge {
///     fn key(&self) -> &str {
///         "age"
///     }
///
///     fn message(&self) -> &str {
///         "Must be at least 18"
///     }
///
///     fn validate(&self, scope: &mut RuleScope<'_>) -> RuleResult {
///         if scope.require_i64("age")? < self.0 {
///             scope.invalidate(None, None);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ComplianceRule: Send + Sync {
    /// Field key errors are recorded under by default.
    fn key(&self) -> &str {
        DEFAULT_KEY
    }

    /// Message recorded by default.
    fn message(&self) -> &str {
        DEFAULT_MESSAGE
    }

    /// Name used in log events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Run the check.
    ///
    /// Finding bad data is not an error: record it through `scope` and
    /// return `Ok(())`. Return `Err` only when the check itself could not
    /// run; the fault becomes one message under [`key`](Self::key).
    fn validate(&self, scope: &mut RuleScope<'_>) -> RuleResult;
}

/// Chain entry point, implemented for every [`ComplianceRule`].
pub trait RuleHandler {
    /// Run this rule against `context`, then the rest of the chain.
    ///
    /// If an earlier rule stopped the chain this rule does no work and only
    /// passes the context on. Faults and panics raised by the rule are
    /// recorded as one message under the rule's key. The rest of the chain
    /// is always invoked; stopping happens through the stop flag only.
    fn handle(&self, context: RuleContext, next: Next<'_>) -> RuleContext;
}

impl<R: ComplianceRule + ?Sized> RuleHandler for R {
    fn handle(&self, context: RuleContext, next: Next<'_>) -> RuleContext {
        next.run(step(self, context, next.config()))
    }
}

/// Run one rule's own work: the stop guard, `validate` and fault
/// containment. Never touches the rest of the chain.
fn step<R: ComplianceRule + ?Sized>(
    rule: &R,
    mut context: RuleContext,
    config: &ComplianceConfig,
) -> RuleContext {
    if context.must_stop() {
        trace!(rule = rule.name(), "chain stopped, rule skipped");
        return context;
    }

    let outcome = {
        let mut scope = RuleScope::new(&mut context, rule.key(), rule.message());
        panic::catch_unwind(AssertUnwindSafe(|| rule.validate(&mut scope)))
            .unwrap_or_else(|payload| Err(RuleFault::from_panic(&*payload)))
    };

    if let Err(fault) = outcome {
        warn!(
            rule = rule.name(),
            key = rule.key(),
            error = %fault,
            "rule fault recorded as validation error"
        );
        let text = config.fault_text(&fault.to_string());
        context.push_error(rule.key(), &text);
    }

    context
}

impl fmt::Debug for dyn ComplianceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplianceRule")
            .field("name", &self.name())
            .field("key", &self.key())
            .finish()
    }
}

// ============================================================================
// CONTINUATION
// ============================================================================

/// "Run the remainder of the chain."
///
/// Holds the rules after the current one. Running it on an empty remainder
/// returns the context unchanged. The remainder runs in a loop, so stack
/// use does not grow with the length of the chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rules: &'a [SharedRule],
    config: &'a ComplianceConfig,
}

impl<'a> Next<'a> {
    pub(crate) fn new(rules: &'a [SharedRule], config: &'a ComplianceConfig) -> Self {
        Self { rules, config }
    }

    /// Run every remaining rule against `context`, in order.
    pub fn run(self, context: RuleContext) -> RuleContext {
        self.rules
            .iter()
            .fold(context, |context, rule| step(&**rule, context, self.config))
    }

    /// Number of rules still to run.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rules.len()
    }

    /// Configuration of the run.
    #[must_use]
    pub fn config(&self) -> &'a ComplianceConfig {
        self.config
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rules.len())
            .finish()
    }
}

// ============================================================================
// RULE SCOPE
// ============================================================================

/// A rule's view of the context for one invocation.
///
/// Carries the rule's declared key and message so the `invalidate` helpers
/// can fall back to them.
pub struct RuleScope<'a> {
    context: &'a mut RuleContext,
    key: &'a str,
    message: &'a str,
}

impl<'a> RuleScope<'a> {
    pub(crate) fn new(context: &'a mut RuleContext, key: &'a str, message: &'a str) -> Self {
        Self {
            context,
            key,
            message,
        }
    }

    /// Request data.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        self.context.payload()
    }

    /// Mutable request data. Later rules see every change.
    pub fn payload_mut(&mut self) -> &mut Payload {
        self.context.payload_mut()
    }

    /// Value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.context.payload().get(field)
    }

    /// Value of `field`, or a [`RuleFault::MissingField`].
    pub fn require(&self, field: &str) -> Result<&Value, RuleFault> {
        self.get(field).ok_or_else(|| RuleFault::missing(field))
    }

    /// Integer value of `field`. Numeric strings are accepted.
    pub fn require_i64(&self, field: &str) -> Result<i64, RuleFault> {
        let value = self.require(field)?;
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| RuleFault::type_mismatch(field, "an integer"))
    }

    /// Floating-point value of `field`. Numeric strings are accepted.
    pub fn require_f64(&self, field: &str) -> Result<f64, RuleFault> {
        let value = self.require(field)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| RuleFault::type_mismatch(field, "a number"))
    }

    /// String value of `field`.
    pub fn require_str(&self, field: &str) -> Result<&str, RuleFault> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| RuleFault::type_mismatch(field, "a string"))
    }

    /// Boolean value of `field`.
    pub fn require_bool(&self, field: &str) -> Result<bool, RuleFault> {
        self.require(field)?
            .as_bool()
            .ok_or_else(|| RuleFault::type_mismatch(field, "a boolean"))
    }

    /// Errors recorded so far, by this and earlier rules.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        self.context.errors()
    }

    /// The rule's declared key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key
    }

    /// The rule's declared message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message
    }

    /// Whether the chain has been asked to stop.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.context.must_stop()
    }

    /// Record one message. `None` falls back to the declared key/message.
    ///
    /// The chain keeps running.
    pub fn invalidate(&mut self, key: Option<&str>, message: Option<&str>) {
        let key = key.unwrap_or(self.key);
        let message = message.unwrap_or(self.message);
        trace!(key, message, "invalidated");
        self.context.push_error(key, message);
    }

    /// Record one message, then stop the chain.
    pub fn invalidate_and_exit(&mut self, key: Option<&str>, message: Option<&str>) {
        self.invalidate(key, message);
        self.skip_next();
    }

    /// Stop the chain without recording anything.
    ///
    /// Every later rule in this run passes the context through untouched.
    pub fn skip_next(&mut self) {
        self.context.stop();
    }

    /// Declare the status code for an invalid outcome.
    ///
    /// The first declaration in a run wins; later ones are ignored.
    pub fn set_status(&mut self, status: u16) {
        if !self.context.declare_status(status) {
            trace!(
                status,
                kept = ?self.context.status(),
                "status already declared, ignored"
            );
        }
    }
}

impl fmt::Debug for RuleScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleScope")
            .field("key", &self.key)
            .field("message", &self.message)
            .field("context", &self.context)
            .finish()
    }
}

// ============================================================================
// CLOSURE RULE
// ============================================================================

/// A rule backed by a closure.
///
/// # Examples
///
/// ```
/// use compliance_core::{ComplianceValidator, FnRule, SharedRule};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let terms: SharedRule = Arc::new(FnRule::new("terms", "Terms must be accepted", |scope| {
///     if !scope.require_bool("terms")? {
///         scope.invalidate(None, None);
///     }
///     Ok(())
/// }));
///
/// let payload = json!({"terms": false}).as_object().cloned().unwrap();
/// let result = ComplianceValidator::default().validate(&payload, &[terms]);
/// assert_eq!(result.message(), "Terms must be accepted");
/// ```
pub struct FnRule<F> {
    key: Cow<'static, str>,
    message: Cow<'static, str>,
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&mut RuleScope<'_>) -> RuleResult + Send + Sync,
{
    /// Create a rule with a declared key, message and check.
    pub fn new(
        key: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
        check: F,
    ) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            check,
        }
    }
}

impl<F> ComplianceRule for FnRule<F>
where
    F: Fn(&mut RuleScope<'_>) -> RuleResult + Send + Sync,
{
    fn key(&self) -> &str {
        &self.key
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn name(&self) -> &str {
        "FnRule"
    }

    fn validate(&self, scope: &mut RuleScope<'_>) -> RuleResult {
        (self.check)(scope)
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("key", &self.key)
            .field("message", &self.message)
            .field("check", &"<function>")
            .finish()
    }
}

/// Shorthand for an [`Arc`]-wrapped [`FnRule`].
pub fn rule_fn<F>(
    key: impl Into<Cow<'static, str>>,
    message: impl Into<Cow<'static, str>>,
    check: F,
) -> SharedRule
where
    F: Fn(&mut RuleScope<'_>) -> RuleResult + Send + Sync + 'static,
{
    Arc::new(FnRule::new(key, message, check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(rules: &[SharedRule], payload: Value, config: &ComplianceConfig) -> RuleContext {
        let payload = payload.as_object().cloned().unwrap_or_default();
        Next::new(rules, config).run(RuleContext::new(payload))
    }

    struct Silent;

    impl ComplianceRule for Silent {
        fn validate(&self, scope: &mut RuleScope<'_>) -> RuleResult {
            scope.invalidate(None, None);
            Ok(())
        }
    }

    #[test]
    fn undeclared_key_and_message_fall_back_to_defaults() {
        let ctx = run(&[Arc::new(Silent)], json!({}), &ComplianceConfig::default());
        assert_eq!(ctx.errors()[DEFAULT_KEY], vec![DEFAULT_MESSAGE]);
    }

    #[test]
    fn explicit_key_and_message_override_defaults() {
        let rule = rule_fn("k", "m", |scope| {
            scope.invalidate(Some("other"), None);
            scope.invalidate(None, Some("custom"));
            Ok(())
        });
        let ctx = run(&[rule], json!({}), &ComplianceConfig::default());
        assert_eq!(ctx.errors()["other"], vec!["m"]);
        assert_eq!(ctx.errors()["k"], vec!["custom"]);
    }

    #[test]
    fn stopped_context_skips_validate_but_still_returns() {
        let rules = vec![
            rule_fn("a", "stop", |scope| {
                scope.invalidate_and_exit(None, None);
                Ok(())
            }),
            rule_fn("b", "never", |_| panic!("must not run")),
        ];
        let ctx = run(&rules, json!({}), &ComplianceConfig::default());
        assert!(ctx.must_stop());
        assert_eq!(ctx.error_count(), 1);
        assert!(!ctx.errors().contains_key("b"));
    }

    #[test]
    fn skip_next_stops_without_error() {
        let rules = vec![
            rule_fn("a", "unused", |scope| {
                scope.skip_next();
                Ok(())
            }),
            rule_fn("b", "never", |scope| {
                scope.invalidate(None, None);
                Ok(())
            }),
        ];
        let ctx = run(&rules, json!({}), &ComplianceConfig::default());
        assert!(ctx.must_stop());
        assert!(ctx.is_clean());
    }

    #[test]
    fn fault_becomes_generic_message() {
        let rule = rule_fn("age", "unused", |scope| {
            scope.require_i64("age")?;
            Ok(())
        });
        let ctx = run(&[rule], json!({}), &ComplianceConfig::production());
        assert_eq!(ctx.errors()["age"], vec!["Unprocessable Content"]);
    }

    #[test]
    fn fault_is_described_in_debug_mode() {
        let rule = rule_fn("age", "unused", |scope| {
            scope.require_i64("age")?;
            Ok(())
        });
        let ctx = run(&[rule], json!({"age": "old"}), &ComplianceConfig::development());
        assert_eq!(
            ctx.errors()["age"],
            vec!["Exception: field `age` is not an integer"]
        );
    }

    #[test]
    fn panic_is_contained() {
        let rules = vec![
            rule_fn("boom", "unused", |_| panic!("kaboom")),
            rule_fn("after", "ran", |scope| {
                scope.invalidate(None, None);
                Ok(())
            }),
        ];
        let ctx = run(&rules, json!({}), &ComplianceConfig::development());
        assert_eq!(ctx.errors()["boom"], vec!["Exception: rule panicked: kaboom"]);
        assert_eq!(ctx.errors()["after"], vec!["ran"]);
    }

    #[test]
    fn messages_recorded_before_a_fault_are_kept() {
        let rule = rule_fn("k", "m", |scope| {
            scope.invalidate(None, Some("partial"));
            Err(RuleFault::msg("then failed"))
        });
        let ctx = run(&[rule], json!({}), &ComplianceConfig::production());
        assert_eq!(ctx.errors()["k"], vec!["partial", "Unprocessable Content"]);
    }

    #[test]
    fn payload_changes_are_visible_downstream() {
        let rules = vec![
            rule_fn("name", "unused", |scope| {
                let trimmed = scope.require_str("name")?.trim().to_string();
                scope.payload_mut().insert("name".into(), json!(trimmed));
                Ok(())
            }),
            rule_fn("name", "Name must be trimmed", |scope| {
                if scope.require_str("name")? != "ada" {
                    scope.invalidate(None, None);
                }
                Ok(())
            }),
        ];
        let ctx = run(&rules, json!({"name": "  ada "}), &ComplianceConfig::default());
        assert!(ctx.is_clean());
        assert_eq!(ctx.payload()["name"], json!("ada"));
    }

    #[test]
    fn numeric_helpers_accept_numeric_strings() {
        let rule = rule_fn("n", "unused", |scope| {
            assert_eq!(scope.require_i64("int")?, 7);
            assert!((scope.require_f64("float")? - 2.5).abs() < f64::EPSILON);
            assert!(scope.require_bool("flag")?);
            Ok(())
        });
        let ctx = run(
            &[rule],
            json!({"int": " 7", "float": "2.5", "flag": true}),
            &ComplianceConfig::default(),
        );
        assert!(ctx.is_clean());
    }

    #[test]
    fn set_status_keeps_first_declaration() {
        let rules = vec![
            rule_fn("a", "m", |scope| {
                scope.set_status(403);
                Ok(())
            }),
            rule_fn("b", "m", |scope| {
                scope.set_status(409);
                Ok(())
            }),
        ];
        let ctx = run(&rules, json!({}), &ComplianceConfig::default());
        assert_eq!(ctx.status(), Some(403));
    }

    #[test]
    fn handle_runs_the_rule_then_the_remainder() {
        let config = ComplianceConfig::default();
        let rest = vec![rule_fn("b", "B", |scope| {
            scope.invalidate(None, None);
            Ok(())
        })];
        let first = rule_fn("a", "A", |scope| {
            scope.invalidate(None, None);
            Ok(())
        });

        let ctx = first.handle(RuleContext::default(), Next::new(&rest, &config));
        let keys: Vec<_> = ctx.errors().keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn stopped_handle_still_passes_the_context_on() {
        let config = ComplianceConfig::default();
        let rest = vec![rule_fn("b", "B", |scope| {
            scope.invalidate(None, None);
            Ok(())
        })];
        let mut ctx = RuleContext::default();
        ctx.stop();

        let rule = rule_fn("a", "A", |_| panic!("must not run"));
        let ctx = rule.handle(ctx, Next::new(&rest, &config));
        assert!(ctx.must_stop());
        assert!(ctx.is_clean());
    }

    #[test]
    fn next_on_empty_remainder_returns_context_unchanged() {
        let config = ComplianceConfig::default();
        let next = Next::new(&[], &config);
        assert_eq!(next.remaining(), 0);
        let ctx = RuleContext::new(json!({"a": 1}).as_object().cloned().unwrap());
        assert_eq!(next.run(ctx.clone()), ctx);
    }

    #[test]
    fn debug_output_names_the_rule() {
        let rule: SharedRule = Arc::new(FnRule::new("k", "m", |_| Ok(())));
        let rendered = format!("{rule:?}");
        assert!(rendered.contains("FnRule"));
        assert!(rendered.contains("\"k\""));
    }
}
