//! Security scanning of the discovered APIs.
//!
//! The assessment's critical count drives the documentation branch.

use crate::collaborators::{ScanType, SecurityScanRequest, SecurityScanner};
use crate::error::Result;
use crate::flow::{FlowState, Stage, StageOutput};

/// Scans the discovered items.
#[derive(Debug, Clone, Default)]
pub struct SecurityStage {
    scan_type: ScanType,
    target: Option<String>,
}

impl SecurityStage {
    pub fn new(scan_type: ScanType) -> Self {
        Self {
            scan_type,
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl Stage for SecurityStage {
    fn execute(&self, state: &FlowState) -> Result<StageOutput> {
        let assessment = SecurityScanner::new().scan(&SecurityScanRequest {
            target: self.target.clone(),
            scan_type: Some(self.scan_type),
            items: state.discovered_items().to_vec(),
        })?;
        Ok(StageOutput::Security { assessment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::DiscoveredItem;

    #[test]
    fn scans_items_from_state() {
        let mut state = FlowState::new();
        state.apply(StageOutput::Discovery {
            items: vec![DiscoveredItem::new("Internal API", "1.0", "REST")],
        });

        let output = SecurityStage::new(ScanType::Comprehensive)
            .with_target("staging")
            .execute(&state)
            .unwrap();
        let StageOutput::Security { assessment } = output else {
            panic!("expected security output");
        };
        assert_eq!(assessment.critical_findings, 1);
        assert_eq!(assessment.target, "staging");
    }
}
