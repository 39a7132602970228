//! Sequential execution of a rule list against one context.

use tracing::debug;

use crate::config::ComplianceConfig;
use crate::context::RuleContext;
use crate::rule::{Next, SharedRule};

/// Runs rules in list order against a single context.
///
/// The runner only builds the first continuation over the whole list. It
/// never checks the stop flag itself and never retries: stopping is each
/// rule's guard, faults are each rule's to contain.
#[derive(Debug, Clone, Default)]
pub struct RuleChainRunner {
    config: ComplianceConfig,
}

impl RuleChainRunner {
    /// Create a runner with the given configuration.
    #[must_use]
    pub fn new(config: ComplianceConfig) -> Self {
        Self { config }
    }

    /// Configuration used for fault conversion.
    #[must_use]
    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Run `rules` against `context` and return the mutated context.
    ///
    /// An empty list returns the context unchanged.
    pub fn run(&self, context: RuleContext, rules: &[SharedRule]) -> RuleContext {
        debug!(rules = rules.len(), "running compliance chain");

        let context = Next::new(rules, &self.config).run(context);

        debug!(
            errors = context.error_count(),
            stopped = context.must_stop(),
            "compliance chain finished"
        );
        context
    }
}
