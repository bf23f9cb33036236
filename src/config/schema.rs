//! Configuration schema definitions for apiflow.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format. Every field has a default, so an empty or
//! missing file yields a usable configuration.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::collaborators::probe::{DEFAULT_PATHS, DEFAULT_PORTS};
use crate::collaborators::sdk::{DEFAULT_LANGUAGES, DEFAULT_PACKAGE_NAME};
use crate::flow::artifacts::DiscoveredItem;

/// Root configuration structure for `.apiflow/config.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FlowConfig {
    /// Emit per-stage progress
    #[serde(skip_serializing_if = "is_false")]
    pub verbose: bool,

    /// Overall run budget in seconds, checked between stages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_seconds: Option<u64>,

    pub discovery: DiscoveryConfig,

    pub security: SecurityConfig,

    pub sdk: SdkConfig,

    pub output: OutputConfig,
}

/// Where discovery looks for APIs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// APIs known ahead of time
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inventory: Vec<DiscoveredItem>,

    /// Live network probing
    pub probe: ProbeConfig,

    /// Scanning the project's git repository for API definitions
    pub repository: RepositoryConfig,
}

/// Repository analysis settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Analysis is opt-in
    pub enabled: bool,

    /// Repository to analyze; relative paths resolve against the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Network probe settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probing is opt-in
    pub enabled: bool,

    pub host: String,

    pub ports: Vec<u16>,

    pub paths: Vec<String>,

    /// Per-connection and per-request timeout
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            paths: DEFAULT_PATHS.iter().map(|p| p.to_string()).collect(),
            timeout_ms: 1000,
        }
    }
}

/// Security scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SecurityConfig {
    /// comprehensive, owasp, or compliance
    pub scan_type: String,

    /// Label recorded in the assessment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            scan_type: "comprehensive".to_string(),
            target: None,
        }
    }
}

/// SDK generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SdkConfig {
    pub languages: Vec<String>,

    /// Base package name; each language applies its own casing
    pub package_name: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
        }
    }
}

/// Where artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Relative paths resolve against the project root
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
        }
    }
}

fn is_false(v: &bool) -> bool {
    !v
}
