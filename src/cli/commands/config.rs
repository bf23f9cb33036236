//! Config command implementation.
//!
//! The `apiflow config` command shows resolved configuration.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigArgs;
use crate::config::{load_config, ConfigPaths, FlowConfig};
use crate::error::{FlowError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(project_root: &Path, args: ConfigArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: None,
            args,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn source_paths(&self) -> Vec<PathBuf> {
        match &self.config_path {
            Some(path) => vec![path.clone()],
            None => ConfigPaths::discover(&self.project_root)
                .all_existing()
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            let schema = schemars::schema_for!(FlowConfig);
            ui.data(&serde_json::to_string_pretty(&schema)?);
            return Ok(CommandResult::success());
        }

        let config = match load_config(&self.project_root, self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) if e.is_config_error() => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if self.args.json {
            ui.data(&serde_json::to_string_pretty(&config)?);
            return Ok(CommandResult::success());
        }

        let sources = self.source_paths();
        if sources.is_empty() {
            ui.message("# defaults (no config file found)");
        }
        for path in &sources {
            ui.message(&format!("# {}", path.display()));
        }
        ui.message("");

        let yaml = serde_yaml::to_string(&config).map_err(|e| FlowError::Serialization {
            message: e.to_string(),
        })?;
        ui.data(&yaml);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".apiflow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn config_command_creation() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(temp.path(), ConfigArgs::default());
        assert_eq!(cmd.project_root(), temp.path());
    }

    #[test]
    fn shows_defaults_without_config() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(temp.path(), ConfigArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_output("defaults"));
        assert!(ui.data().contains("scan_type: comprehensive"));
    }

    #[test]
    fn shows_config_path() {
        let temp = setup_project("sdk:\n  languages: [java]\n");
        let cmd = ConfigCommand::new(temp.path(), ConfigArgs::default());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.messages().iter().any(|m| m.contains("config.yml")));
        assert!(ui.data().contains("- java"));
    }

    #[test]
    fn json_output() {
        let temp = setup_project("deadline_seconds: 45\n");
        let args = ConfigArgs {
            json: true,
            ..Default::default()
        };
        let cmd = ConfigCommand::new(temp.path(), args);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.data()).unwrap();
        assert_eq!(value["deadline_seconds"], 45);
        assert_eq!(value["output"]["dir"], "outputs");
    }

    #[test]
    fn schema_output() {
        let temp = TempDir::new().unwrap();
        let args = ConfigArgs {
            schema: true,
            ..Default::default()
        };
        let cmd = ConfigCommand::new(temp.path(), args);
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let schema: serde_json::Value = serde_json::from_str(&ui.data()).unwrap();
        assert!(schema["properties"]["discovery"].is_object());
    }

    #[test]
    fn missing_override_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(temp.path(), ConfigArgs::default())
            .with_config_path(Some(temp.path().join("nope.yml")));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_output("nope.yml"));
    }
}
