//! Error types for apiflow operations.
//!
//! This module defines [`FlowError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Collaborator failures ([`FlowError::Collaborator`]) are recovered by the
//!   orchestrator and recorded as failed stages
//! - [`FlowError::RoutingAmbiguity`] is a broken stage order and aborts a run
//! - Use `anyhow::Error` (via `FlowError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::collaborators::CollaboratorError;

/// Core error type for apiflow operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// An external tool invoked by a stage failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The router was consulted before the stage it depends on had run.
    #[error("Routing for stage '{stage}' requires '{missing}', which has not run yet")]
    RoutingAmbiguity { stage: String, missing: String },

    /// The router selected an alternate that the stage table does not provide.
    #[error("Stage '{stage}' has no '{variant}' implementation")]
    MissingAlternate { stage: String, variant: String },

    /// The run was cancelled between stages.
    #[error("cancelled")]
    Cancelled,

    /// The overall run deadline elapsed between stages.
    #[error("deadline_exceeded")]
    DeadlineExceeded,

    /// Failed to serialize a report or artifact.
    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Whether this error must abort the whole run instead of failing one stage.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FlowError::RoutingAmbiguity { .. } | FlowError::MissingAlternate { .. }
        )
    }

    /// Whether this error came from loading or validating configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FlowError::ConfigNotFound { .. }
                | FlowError::ConfigParseError { .. }
                | FlowError::ConfigValidationError { .. }
        )
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::Serialization {
            message: e.to_string(),
        }
    }
}

/// Result type alias for apiflow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorErrorKind;

    #[test]
    fn config_not_found_displays_path() {
        let err = FlowError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = FlowError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn collaborator_error_is_transparent() {
        let err: FlowError =
            CollaboratorError::new(CollaboratorErrorKind::Network, "connection refused").into();
        assert_eq!(err.to_string(), "network error: connection refused");
        assert!(!err.is_fatal());
    }

    #[test]
    fn routing_ambiguity_is_fatal() {
        let err = FlowError::RoutingAmbiguity {
            stage: "security".into(),
            missing: "discovery".into(),
        };
        assert!(err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("security"));
        assert!(msg.contains("discovery"));
    }

    #[test]
    fn cancellation_displays_report_marker() {
        assert_eq!(FlowError::Cancelled.to_string(), "cancelled");
        assert_eq!(FlowError::DeadlineExceeded.to_string(), "deadline_exceeded");
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FlowError = io_err.into();
        assert!(matches!(err, FlowError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(FlowError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }

    #[test]
    fn config_errors_are_classified() {
        let err = FlowError::ConfigValidationError {
            message: "bad".into(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_fatal());
        assert!(!FlowError::Cancelled.is_config_error());
    }
}
