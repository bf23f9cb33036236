//! Concrete pipeline stages.
//!
//! Each stage wraps one collaborator, reads what it needs from
//! [`FlowState`](crate::flow::FlowState), and returns its own output.

pub mod discovery;
pub mod documentation;
pub mod sdk;
pub mod security;

use std::time::Duration;

pub use discovery::DiscoveryStage;
pub use documentation::{DocumentationStage, SecurityReportStage};
pub use sdk::SdkStage;
pub use security::SecurityStage;

use crate::collaborators::{ProbeRequest, RepoAnalysisRequest, ScanType};
use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::flow::StageTable;

/// Build the standard four-stage table from configuration.
///
/// # Errors
///
/// Returns `ConfigValidationError` when `security.scan_type` is unknown.
pub fn canonical_table(config: &FlowConfig) -> Result<StageTable> {
    let mut discovery = DiscoveryStage::new(config.discovery.inventory.clone());
    let repository = &config.discovery.repository;
    if repository.enabled {
        discovery = discovery.with_repository(RepoAnalysisRequest {
            repo_path: repository.path.clone(),
        });
    }
    let probe = &config.discovery.probe;
    if probe.enabled {
        discovery = discovery.with_probe(ProbeRequest {
            host: Some(probe.host.clone()),
            ports: Some(probe.ports.clone()),
            paths: Some(probe.paths.clone()),
            timeout: Some(Duration::from_millis(probe.timeout_ms)),
        });
    }

    let scan_type: ScanType = config
        .security
        .scan_type
        .parse()
        .map_err(|message| FlowError::ConfigValidationError { message })?;
    let mut security = SecurityStage::new(scan_type);
    if let Some(target) = &config.security.target {
        security = security.with_target(target.clone());
    }

    let sdk = SdkStage::new()
        .with_languages(config.sdk.languages.clone())
        .with_package_name(config.sdk.package_name.clone());

    Ok(StageTable::canonical(
        discovery,
        security,
        DocumentationStage::new(),
        SecurityReportStage::new(),
        sdk,
    ))
}
