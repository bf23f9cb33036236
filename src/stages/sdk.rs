//! SDK generation for the discovered APIs.

use crate::collaborators::{SdkGenerator, SdkRequest};
use crate::error::Result;
use crate::flow::{FlowState, Stage, StageOutput};

/// Generates client SDKs for the discovered items.
#[derive(Debug, Clone, Default)]
pub struct SdkStage {
    languages: Option<Vec<String>>,
    package_name: Option<String>,
}

impl SdkStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = Some(languages);
        self
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }
}

impl Stage for SdkStage {
    fn execute(&self, state: &FlowState) -> Result<StageOutput> {
        let artifacts = SdkGenerator::new().generate(&SdkRequest {
            languages: self.languages.clone(),
            package_name: self.package_name.clone(),
            version: None,
            items: state.discovered_items().to_vec(),
        })?;
        Ok(StageOutput::SdkGeneration { artifacts })
    }
}
