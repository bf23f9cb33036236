//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - `security.scan_type` must be a known scan type
//! - SDK language names and the package name must not be empty
//! - The probe needs a host, at least one port, and a non-zero timeout
//! - Inventory entries must be named

use crate::collaborators::ScanType;
use crate::config::schema::FlowConfig;
use crate::error::{FlowError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Dotted path of the offending field
    pub field: String,
}

impl ValidationError {
    fn new(rule: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
            field: field.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// Collects every error rather than stopping at the first one.
pub fn validate_config(config: &FlowConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_discovery(config));
    errors.extend(validate_security(config));
    errors.extend(validate_sdk(config));

    errors
}

fn validate_discovery(config: &FlowConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, item) in config.discovery.inventory.iter().enumerate() {
        if item.name.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-inventory-name",
                format!("discovery.inventory[{}].name", i),
                format!("Inventory entry {} has an empty name", i),
            ));
        }
    }

    let probe = &config.discovery.probe;
    if probe.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "discovery.probe.timeout_ms",
            "Probe timeout must be greater than zero",
        ));
    }
    if probe.enabled {
        if probe.host.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-probe-host",
                "discovery.probe.host",
                "Probe is enabled but no host is set",
            ));
        }
        if probe.ports.is_empty() {
            errors.push(ValidationError::new(
                "no-probe-ports",
                "discovery.probe.ports",
                "Probe is enabled but no ports are listed",
            ));
        }
    }

    errors
}

fn validate_security(config: &FlowConfig) -> Vec<ValidationError> {
    match config.security.scan_type.parse::<ScanType>() {
        Ok(_) => Vec::new(),
        Err(_) => vec![ValidationError::new(
            "unknown-scan-type",
            "security.scan_type",
            format!(
                "Unknown scan type '{}' (expected comprehensive, owasp, or compliance)",
                config.security.scan_type
            ),
        )],
    }
}

fn validate_sdk(config: &FlowConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, language) in config.sdk.languages.iter().enumerate() {
        if language.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-language",
                format!("sdk.languages[{}]", i),
                format!("SDK language {} is empty", i),
            ));
        }
    }

    if config.sdk.package_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-package-name",
            "sdk.package_name",
            "SDK package name must not be empty",
        ));
    }

    errors
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &FlowConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(FlowError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
