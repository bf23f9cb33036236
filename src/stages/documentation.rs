//! Documentation stage and its security report alternate.

use crate::collaborators::{CollaboratorError, DocumentationBuilder, DocumentationRequest};
use crate::error::Result;
use crate::flow::{FlowState, Stage, StageOutput};

/// Renders reference documentation for the discovered items.
#[derive(Debug, Clone, Default)]
pub struct DocumentationStage {
    title: Option<String>,
}

impl DocumentationStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Stage for DocumentationStage {
    fn execute(&self, state: &FlowState) -> Result<StageOutput> {
        let bundle = DocumentationBuilder::new().build(&DocumentationRequest {
            title: self.title.clone(),
            items: state.discovered_items().to_vec(),
            assessment: state.security_assessment().cloned(),
        })?;
        Ok(StageOutput::Documentation { bundle })
    }
}

/// Renders a security report instead of reference docs.
///
/// Runs in the documentation slot when the assessment has critical findings.
#[derive(Debug, Clone, Default)]
pub struct SecurityReportStage {
    title: Option<String>,
}

impl SecurityReportStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Stage for SecurityReportStage {
    fn execute(&self, state: &FlowState) -> Result<StageOutput> {
        let assessment = state.security_assessment().cloned().ok_or_else(|| {
            CollaboratorError::validation("no security assessment to report on")
        })?;
        let bundle = DocumentationBuilder::new().build_security_report(&DocumentationRequest {
            title: self.title.clone(),
            items: state.discovered_items().to_vec(),
            assessment: Some(assessment),
        })?;
        Ok(StageOutput::Documentation { bundle })
    }
}
