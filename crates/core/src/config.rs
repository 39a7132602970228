//! Runtime configuration for compliance runs.
//!
//! The only environment coupling the engine has is the debug flag that
//! decides how much of a faulting rule's description reaches the caller.
//! Everything is passed in at construction; nothing is read from globals
//! while a chain runs.

use serde::Deserialize;

/// Status code applied to an invalid result when no rule declared one.
pub const DEFAULT_STATUS: u16 = 422;

/// Message recorded for a faulting rule outside debug mode.
pub const DEFAULT_FAULT_MESSAGE: &str = "Unprocessable Content";

/// Prefix put in front of a fault description in debug mode.
pub const DEFAULT_FAULT_PREFIX: &str = "Exception: ";

/// Configuration shared by the validator and every rule chain it runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Expose fault descriptions in recorded messages.
    pub debug: bool,
    /// Status code for invalid results without a rule-declared code.
    pub default_status: u16,
    /// Message recorded for a faulting rule when `debug` is off.
    pub fault_message: String,
    /// Prefix for the fault description when `debug` is on.
    pub fault_prefix: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_status: DEFAULT_STATUS,
            fault_message: DEFAULT_FAULT_MESSAGE.to_string(),
            fault_prefix: DEFAULT_FAULT_PREFIX.to_string(),
        }
    }
}

impl ComplianceConfig {
    /// Create configuration from environment variables.
    ///
    /// - `COMPLIANCE_DEBUG`, falling back to `APP_DEBUG`: debug mode. Truthy
    ///   values are `1`, `true`, `yes` and `on` (case-insensitive); anything
    ///   else turns debug off.
    /// - `COMPLIANCE_DEFAULT_STATUS`: status code for invalid results
    ///   without a declared one. Ignored unless it parses as `u16`.
    ///
    /// Unset variables keep the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(debug) = ["COMPLIANCE_DEBUG", "APP_DEBUG"]
            .into_iter()
            .find_map(|name| lookup(name))
        {
            config.debug = parse_flag(&debug);
        }

        if let Some(status) =
            lookup("COMPLIANCE_DEFAULT_STATUS").and_then(|raw| raw.trim().parse::<u16>().ok())
        {
            config.default_status = status;
        }

        config
    }

    /// Development configuration (fault descriptions exposed).
    #[must_use]
    pub fn development() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    /// Production configuration (generic fault message).
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Toggle debug mode.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the default status code for invalid results.
    #[must_use]
    pub fn with_default_status(mut self, status: u16) -> Self {
        self.default_status = status;
        self
    }

    /// Render the message recorded for a rule fault.
    pub(crate) fn fault_text(&self, description: &str) -> String {
        if self.debug {
            format!("{}{description}", self.fault_prefix)
        } else {
            self.fault_message.clone()
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
