//! apiflow - Staged API ecosystem pipeline.
//!
//! apiflow discovers APIs, assesses their security, documents them, and
//! generates client SDKs. The stages run in a fixed order over one shared
//! [`flow::FlowState`]; a router decides before each stage whether it runs,
//! is skipped, or is replaced by an alternate.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`collaborators`] - Network probe, repository analyzer, security scanner, documentation and SDK generators
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`flow`] - Orchestrator, router, state, and reports
//! - [`output`] - Writing reports and artifacts to disk
//! - [`stages`] - Concrete pipeline stages
//! - [`ui`] - Terminal output and progress
//!
//! # Example
//!
//! ```
//! use apiflow::config::FlowConfig;
//! use apiflow::flow::{DiscoveredItem, Orchestrator, RunStatus};
//! use apiflow::stages::canonical_table;
//!
//! let mut config = FlowConfig::default();
//! config.discovery.inventory = vec![DiscoveredItem::new("Orders API", "2.0.0", "REST")];
//!
//! let report = Orchestrator::new(canonical_table(&config).unwrap()).run().unwrap();
//! assert_eq!(report.status, RunStatus::Completed);
//! assert_eq!(report.results.item_count, 1);
//! assert!(report.results.sdk_artifacts.contains_key("python"));
//! ```

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod flow;
pub mod output;
pub mod stages;
pub mod ui;

pub use error::{FlowError, Result};
pub use flow::{FlowReport, FlowState, Orchestrator, RunOptions, StageTable};
