//! Artifact writer.
//!
//! Layout under the output directory:
//!
//! ```text
//! report.json
//! docs/api_documentation.md      (or docs/security_report.md)
//! sdks/<language>/<file_name>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::flow::{DocumentationVariant, FlowReport};

/// Files written for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub report: PathBuf,
    pub documentation: Option<PathBuf>,
    pub sdks: Vec<PathBuf>,
}

impl WrittenArtifacts {
    /// Every written path, report first.
    pub fn all(&self) -> Vec<&Path> {
        let mut paths = vec![self.report.as_path()];
        paths.extend(self.documentation.as_deref());
        paths.extend(self.sdks.iter().map(PathBuf::as_path));
        paths
    }
}

/// Writes a [`FlowReport`] and its artifacts to a directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the report and whatever artifacts it carries.
    ///
    /// Directories are created as needed; existing files are overwritten.
    pub fn write(&self, report: &FlowReport) -> Result<WrittenArtifacts> {
        fs::create_dir_all(&self.dir)?;

        let report_path = self.dir.join("report.json");
        fs::write(&report_path, report.to_json()?)?;
        debug!("wrote {}", report_path.display());

        let documentation = match &report.results.documentation {
            Some(bundle) => {
                let name = match bundle.variant {
                    DocumentationVariant::Standard => "api_documentation.md",
                    DocumentationVariant::SecurityReport => "security_report.md",
                };
                let docs_dir = self.dir.join("docs");
                fs::create_dir_all(&docs_dir)?;
                let path = docs_dir.join(name);
                fs::write(&path, &bundle.content)?;
                debug!("wrote {}", path.display());
                Some(path)
            }
            None => None,
        };

        let mut sdks = Vec::new();
        for (language, bundle) in &report.results.sdk_artifacts {
            let lang_dir = self.dir.join("sdks").join(language);
            fs::create_dir_all(&lang_dir)?;
            let path = lang_dir.join(&bundle.file_name);
            fs::write(&path, &bundle.code)?;
            debug!("wrote {}", path.display());
            sdks.push(path);
        }

        Ok(WrittenArtifacts {
            report: report_path,
            documentation,
            sdks,
        })
    }
}
