//! Discovery: configured inventory, plus optional repository analysis and
//! live probing.

use tracing::debug;

use crate::collaborators::{
    NetworkProbe, ProbeRequest, ProbeResponse, RepoAnalysis, RepoAnalysisRequest,
    RepositoryAnalyzer,
};
use crate::error::Result;
use crate::flow::{DiscoveredItem, FlowState, Stage, StageOutput};

/// Collects the APIs later stages work on.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryStage {
    inventory: Vec<DiscoveredItem>,
    repository: Option<RepoAnalysisRequest>,
    probe: Option<ProbeRequest>,
}

impl DiscoveryStage {
    pub fn new(inventory: Vec<DiscoveredItem>) -> Self {
        Self {
            inventory,
            repository: None,
            probe: None,
        }
    }

    /// Also read API definitions out of the git repository in `request`.
    pub fn with_repository(mut self, request: RepoAnalysisRequest) -> Self {
        self.repository = Some(request);
        self
    }

    /// Also probe the network with `request`.
    pub fn with_probe(mut self, request: ProbeRequest) -> Self {
        self.probe = Some(request);
        self
    }
}

impl Stage for DiscoveryStage {
    fn execute(&self, _state: &FlowState) -> Result<StageOutput> {
        let mut items = self.inventory.clone();

        if let Some(request) = &self.repository {
            let analysis = RepositoryAnalyzer::new().analyze(request)?;
            let defined = defined_items(&analysis, &items);
            debug!(
                "{} on {}: {} API files, {} new APIs",
                analysis.repository.display(),
                analysis.branch,
                analysis.api_files.len(),
                defined.len()
            );
            items.extend(defined);
        }

        if let Some(request) = &self.probe {
            let response = NetworkProbe::new().probe(request)?;
            let probed = probed_items(&response, &items);
            debug!(
                "probe of {} found {} new APIs",
                response.host,
                probed.len()
            );
            items.extend(probed);
        }

        Ok(StageOutput::Discovery { items })
    }
}

/// Turn definition documents into items, skipping names already in `known`.
fn defined_items(analysis: &RepoAnalysis, known: &[DiscoveredItem]) -> Vec<DiscoveredItem> {
    let mut items: Vec<DiscoveredItem> = Vec::new();
    for file in analysis.definitions() {
        let name = file.title.clone().unwrap_or_else(|| file.stem().to_string());
        if known.iter().chain(items.iter()).any(|item| item.name == name) {
            continue;
        }
        let version = file.version.clone().unwrap_or_else(|| "unknown".to_string());
        let mut item = DiscoveredItem::new(name, version, "REST");
        if let Some(server) = &file.server {
            item = item.with_base_url(server.clone());
        }
        items.push(item);
    }
    items
}

/// Turn API-like services into items, skipping URLs already in `known`.
fn probed_items(response: &ProbeResponse, known: &[DiscoveredItem]) -> Vec<DiscoveredItem> {
    response
        .api_services()
        .filter(|service| {
            !known
                .iter()
                .any(|item| item.base_url.as_deref() == Some(service.base_url.as_str()))
        })
        .map(|service| {
            let kind = if service.speaks_json() { "REST" } else { "HTTP" };
            DiscoveredItem::new(format!("Service on port {}", service.port), "unknown", kind)
                .with_base_url(service.base_url.clone())
        })
        .collect()
}
