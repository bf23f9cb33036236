//! Configuration loading, parsing, and validation for apiflow.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use apiflow::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".apiflow");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "sdk:\n  languages: [java]\n").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.sdk.languages, vec!["java"]);
//! ```
//!
//! # Configuration File Locations
//!
//! apiflow merges configuration in this order:
//! 1. Project config (`.apiflow/config.yml`)
//! 2. Local overrides (`.apiflow/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    DiscoveryConfig, FlowConfig, OutputConfig, ProbeConfig, RepositoryConfig, SdkConfig,
    SecurityConfig,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};
