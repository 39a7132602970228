//! Request-side entry point: build the payload, pick rules by verb, run
//! native and compliance validation and raise one failure.

use std::env;

use compliance_core::{
    ComplianceConfig, ComplianceResult, ComplianceValidator, FieldErrors, Payload, RuleRegistry,
};
use http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::failure::ValidationFailure;
use crate::merge::merge_errors;
use crate::routes::{RouteConfig, RuleRoutes};

/// Host field validation that runs before the compliance chain.
///
/// Implemented for closures `Fn(&Payload) -> Result<(), FieldErrors>`.
pub trait FieldValidator {
    /// Validate `payload`, returning field-keyed messages on failure.
    fn validate(&self, payload: &Payload) -> Result<(), FieldErrors>;
}

impl<F> FieldValidator for F
where
    F: Fn(&Payload) -> Result<(), FieldErrors>,
{
    fn validate(&self, payload: &Payload) -> Result<(), FieldErrors> {
        self(payload)
    }
}

/// A [`FieldValidator`] that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFieldRules;

impl FieldValidator for NoFieldRules {
    fn validate(&self, _payload: &Payload) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// Adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Settings for the compliance chains. Their `default_status` is
    /// replaced by [`default_status`](Self::default_status).
    pub compliance: ComplianceConfig,
    /// Status of every failure for which no rule declared one, whether
    /// native validation, compliance rules or both rejected the request.
    pub default_status: u16,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            compliance: ComplianceConfig::default(),
            default_status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
        }
    }
}

impl AdapterConfig {
    /// Read configuration from the environment.
    ///
    /// Compliance settings come from [`ComplianceConfig::from_env`];
    /// `COMPLIANCE_HTTP_STATUS` overrides the default failure status.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            compliance: ComplianceConfig::from_lookup(&lookup),
            ..Self::default()
        };
        if let Some(status) =
            lookup("COMPLIANCE_HTTP_STATUS").and_then(|raw| raw.trim().parse::<u16>().ok())
        {
            config.default_status = status;
        }
        config
    }
}

/// Verb-routed compliance validation for one endpoint.
#[derive(Debug, Clone)]
pub struct ComplianceRequest {
    routes: RuleRoutes,
    validator: ComplianceValidator,
    default_status: StatusCode,
}

impl ComplianceRequest {
    /// Adapter over `routes` with default configuration.
    #[must_use]
    pub fn new(routes: RuleRoutes) -> Self {
        Self {
            routes,
            validator: ComplianceValidator::default(),
            default_status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Adapter over `routes` with explicit configuration.
    pub fn with_config(routes: RuleRoutes, config: AdapterConfig) -> Result<Self, AdapterError> {
        let default_status = StatusCode::from_u16(config.default_status)
            .map_err(|_| AdapterError::InvalidStatus(config.default_status))?;
        let compliance = config.compliance.with_default_status(config.default_status);
        Ok(Self {
            routes,
            validator: ComplianceValidator::new(compliance),
            default_status,
        })
    }

    /// Adapter whose routes are resolved from identifiers.
    pub fn from_route_config(
        routes: &RouteConfig,
        registry: &RuleRegistry,
        config: AdapterConfig,
    ) -> Result<Self, AdapterError> {
        Self::with_config(routes.resolve(registry)?, config)
    }

    /// Routes in use.
    #[must_use]
    pub fn routes(&self) -> &RuleRoutes {
        &self.routes
    }

    /// Build the validation payload: the body overlaid with route
    /// parameters. A route parameter replaces a body field of the same name.
    #[must_use]
    pub fn payload<I, K, V>(body: Payload, route_params: I) -> Payload
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut payload = body;
        for (name, value) in route_params {
            payload.insert(name.into(), value.into());
        }
        payload
    }

    /// Run the compliance rules selected for `method` over `payload`.
    #[must_use]
    pub fn check(&self, method: &Method, payload: &Payload) -> ComplianceResult {
        let rules = self.routes.select(method);
        self.validator.validate(payload, &rules)
    }

    /// Validate a request whose body and route parameters are already
    /// resolved.
    ///
    /// Native validation runs first. When it passes, an invalid compliance
    /// result is raised as-is. When it fails, compliance still runs and both
    /// error sets are merged into one failure. Returns the merged payload
    /// when everything passes.
    pub fn validate_resolved<I, K, V, N>(
        &self,
        method: &Method,
        body: Payload,
        route_params: I,
        native: &N,
    ) -> Result<Payload, ValidationFailure>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
        N: FieldValidator + ?Sized,
    {
        let payload = Self::payload(body, route_params);

        match native.validate(&payload) {
            Ok(()) => {
                let result = self.check(method, &payload);
                if result.is_valid() {
                    return Ok(payload);
                }
                let status = self.status_for(result.code());
                debug!(method = %method, status = %status, "request rejected by compliance rules");
                Err(ValidationFailure::new(result.into_errors(), status))
            }
            Err(native_errors) => Err(self.failed_validation(method, &payload, native_errors)),
        }
    }

    /// Build the failure for a request whose native validation failed.
    ///
    /// Compliance rules still run so the caller sees every problem at once.
    #[must_use]
    pub fn failed_validation(
        &self,
        method: &Method,
        payload: &Payload,
        native_errors: FieldErrors,
    ) -> ValidationFailure {
        let result = self.check(method, payload);
        let status = self.status_for(result.code());
        debug!(
            method = %method,
            status = %status,
            native = native_errors.len(),
            compliance = result.errors().len(),
            "request rejected by field validation"
        );
        ValidationFailure::new(merge_errors(result.into_errors(), native_errors), status)
    }

    fn status_for(&self, code: Option<u16>) -> StatusCode {
        let Some(code) = code else {
            return self.default_status;
        };
        StatusCode::from_u16(code).unwrap_or_else(|_| {
            warn!(code, fallback = %self.default_status, "rule declared an invalid status code");
            self.default_status
        })
    }
}
