//! External tools invoked by pipeline stages.
//!
//! Every collaborator follows the same contract: a request struct whose
//! fields are all optional (with a `Default` impl), and a typed response or a
//! [`CollaboratorError`] carrying a kind and a human-readable message.
//!
//! - [`probe`] - Network probing for live API endpoints
//! - [`repo`] - Git repository analysis for API definition files
//! - [`security`] - Rule-based security scanning of discovered APIs
//! - [`docs`] - Documentation and security report rendering
//! - [`sdk`] - Client SDK generation

pub mod docs;
pub mod probe;
pub mod repo;
pub mod sdk;
pub mod security;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use docs::{DocumentationBuilder, DocumentationRequest};
pub use probe::{NetworkProbe, ProbeRequest, ProbeResponse, ProbedEndpoint, ProbedService};
pub use repo::{ApiFile, ApiFileKind, RepoAnalysis, RepoAnalysisRequest, RepositoryAnalyzer};
pub use sdk::{SdkGenerator, SdkRequest, SUPPORTED_LANGUAGES};
pub use security::{ScanType, SecurityScanner, SecurityScanRequest};

/// Category of a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorErrorKind {
    /// Connection or transport failure.
    Network,
    /// A response or input could not be parsed.
    Parse,
    /// The request was well-formed but semantically invalid.
    Validation,
    /// The request asked for something the tool cannot do.
    Unsupported,
}

impl fmt::Display for CollaboratorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollaboratorErrorKind::Network => "network",
            CollaboratorErrorKind::Parse => "parse",
            CollaboratorErrorKind::Validation => "validation",
            CollaboratorErrorKind::Unsupported => "unsupported",
        };
        write!(f, "{}", s)
    }
}

/// Structured failure returned by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct CollaboratorError {
    /// Failure category.
    pub kind: CollaboratorErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl CollaboratorError {
    /// Create an error of the given kind.
    pub fn new(kind: CollaboratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Validation, message)
    }
}
