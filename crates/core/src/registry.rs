//! Resolution of opaque rule identifiers to rule instances.
//!
//! Hosts declare rule lists by identifier (for example in configuration)
//! and register a factory per identifier. Each resolution calls the factory,
//! so rules that carry per-run configuration get a fresh instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::rule::{ComplianceRule, SharedRule};

type Factory = Arc<dyn Fn() -> SharedRule + Send + Sync>;

/// Errors raised while registering or resolving rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No factory is registered for the identifier.
    #[error("unknown compliance rule: {0}")]
    UnknownRule(String),

    /// A factory is already registered for the identifier.
    #[error("compliance rule already registered: {0}")]
    DuplicateRule(String),
}

/// Identifier → factory table.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<String, Factory>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> SharedRule + Send + Sync + 'static,
    {
        let id = id.into();
        if self.factories.contains_key(&id) {
            return Err(RegistryError::DuplicateRule(id));
        }
        debug!(rule = %id, "registered compliance rule");
        self.factories.insert(id, Arc::new(factory));
        Ok(())
    }

    /// Register one shared instance for `id`; every resolution returns it.
    pub fn register_instance<R>(&mut self, id: impl Into<String>, rule: R) -> Result<(), RegistryError>
    where
        R: ComplianceRule + 'static,
    {
        let rule: SharedRule = Arc::new(rule);
        self.register(id, move || Arc::clone(&rule))
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Result<Self, RegistryError>
    where
        F: Fn() -> SharedRule + Send + Sync + 'static,
    {
        self.register(id, factory)?;
        Ok(self)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the rule registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<SharedRule, RegistryError> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::UnknownRule(id.to_string()))
    }

    /// Build rules for every identifier, preserving order.
    ///
    /// Fails on the first unknown identifier.
    pub fn resolve_all<I, S>(&self, ids: I) -> Result<Vec<SharedRule>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| self.resolve(id.as_ref())).collect()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("RuleRegistry").field("rules", &ids).finish()
    }
}
