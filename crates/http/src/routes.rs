//! Per-verb rule lists.
//!
//! A request picks the list registered for its method, then the
//! verb-independent list is appended. Methods without a list of their own
//! (`CONNECT`, `TRACE`, extensions) run only the verb-independent rules.

use std::collections::HashMap;

use compliance_core::{RegistryError, RuleRegistry, SharedRule};
use http::Method;
use serde::Deserialize;
use tracing::trace;

/// Rule lists keyed by HTTP method.
#[derive(Debug, Clone, Default)]
pub struct RuleRoutes {
    by_method: HashMap<Method, Vec<SharedRule>>,
    always: Vec<SharedRule>,
}

impl RuleRoutes {
    /// No rules for any verb.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for `method`.
    #[must_use]
    pub fn on(mut self, method: Method, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.by_method.entry(method).or_default().extend(rules);
        self
    }

    /// Append rules that run for every verb, after the verb's own list.
    #[must_use]
    pub fn always(mut self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.always.extend(rules);
        self
    }

    /// Rules for `GET`.
    #[must_use]
    pub fn get(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::GET, rules)
    }

    /// Rules for `POST`.
    #[must_use]
    pub fn post(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::POST, rules)
    }

    /// Rules for `PUT`.
    #[must_use]
    pub fn put(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::PUT, rules)
    }

    /// Rules for `PATCH`.
    #[must_use]
    pub fn patch(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::PATCH, rules)
    }

    /// Rules for `DELETE`.
    #[must_use]
    pub fn delete(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::DELETE, rules)
    }

    /// Rules for `HEAD`.
    #[must_use]
    pub fn head(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::HEAD, rules)
    }

    /// Rules for `OPTIONS`.
    #[must_use]
    pub fn options(self, rules: impl IntoIterator<Item = SharedRule>) -> Self {
        self.on(Method::OPTIONS, rules)
    }

    /// The ordered rule list for a request with `method`.
    #[must_use]
    pub fn select(&self, method: &Method) -> Vec<SharedRule> {
        let verb = self.by_method.get(method).map_or(&[][..], Vec::as_slice);
        trace!(
            method = %method,
            verb_rules = verb.len(),
            always_rules = self.always.len(),
            "selected compliance rules"
        );
        verb.iter().chain(&self.always).cloned().collect()
    }
}

/// Identifier-based routes, typically loaded from configuration.
///
/// ```
/// use compliance_http::RouteConfig;
///
/// let config: RouteConfig =
///     serde_json::from_str(r#"{"post": ["min-age"], "always": ["not-banned"]}"#).unwrap();
/// assert_eq!(config.post, ["min-age"]);
/// assert!(config.get.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    /// Rule identifiers for `GET`.
    pub get: Vec<String>,
    /// Rule identifiers for `POST`.
    pub post: Vec<String>,
    /// Rule identifiers for `PUT`.
    pub put: Vec<String>,
    /// Rule identifiers for `PATCH`.
    pub patch: Vec<String>,
    /// Rule identifiers for `DELETE`.
    pub delete: Vec<String>,
    /// Rule identifiers for `HEAD`.
    pub head: Vec<String>,
    /// Rule identifiers for `OPTIONS`.
    pub options: Vec<String>,
    /// Rule identifiers appended for every verb.
    pub always: Vec<String>,
}

impl RouteConfig {
    /// Build [`RuleRoutes`] by resolving every identifier through `registry`.
    ///
    /// Fails on the first identifier the registry does not know.
    pub fn resolve(&self, registry: &RuleRegistry) -> Result<RuleRoutes, RegistryError> {
        let verbs = [
            (Method::GET, &self.get),
            (Method::POST, &self.post),
            (Method::PUT, &self.put),
            (Method::PATCH, &self.patch),
            (Method::DELETE, &self.delete),
            (Method::HEAD, &self.head),
            (Method::OPTIONS, &self.options),
        ];

        let mut routes = RuleRoutes::new();
        for (method, ids) in verbs {
            if !ids.is_empty() {
                routes = routes.on(method, registry.resolve_all(ids)?);
            }
        }
        Ok(routes.always(registry.resolve_all(&self.always)?))
    }
}
