//! Stages command implementation.
//!
//! The `apiflow stages` command lists the pipeline stages in execution order
//! together with the routing rule applied before each one.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::StagesArgs;
use crate::config::load_config;
use crate::error::Result;
use crate::flow::StageTable;
use crate::stages::canonical_table;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

#[derive(Debug, Serialize)]
struct StageRow {
    name: String,
    rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternate: Option<String>,
}

/// The stages command implementation.
pub struct StagesCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: StagesArgs,
}

impl StagesCommand {
    pub fn new(project_root: &Path, args: StagesArgs) -> Self {
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

    fn rows(table: &StageTable) -> Vec<StageRow> {
        table
            .entries()
            .iter()
            .map(|entry| StageRow {
                name: entry.name.to_string(),
                rule: entry.hook.describe(),
                depends_on: entry.hook.depends_on().map(|s| s.to_string()),
                alternate: entry.alternate_variant().map(|v| v.to_string()),
            })
            .collect()
    }
}

impl Command for StagesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let table = match load_config(&self.project_root, self.config_path.as_deref())
            .and_then(|config| canonical_table(&config))
        {
            Ok(table) => table,
            Err(e) if e.is_config_error() => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };
        let rows = Self::rows(&table);

        if self.args.json {
            ui.data(&serde_json::to_string_pretty(&rows)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Pipeline stages");
        for (index, row) in rows.iter().enumerate() {
            ui.message(&format!("  {}. {} ({})", index + 1, row.name, row.rule));
            if let Some(alternate) = &row.alternate {
                ui.message(&format!("     alternate: {}", alternate));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_stages_in_order() {
        let temp = TempDir::new().unwrap();
        let cmd = StagesCommand::new(temp.path(), StagesArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(
            ui.messages()[0],
            "  1. discovery (always run)".to_string()
        );
        assert!(ui.messages()[1].starts_with("  2. security"));
        assert!(ui.has_output("alternate: generate_security_report"));
        assert!(ui.messages().last().unwrap().starts_with("  4. sdk_generation"));
    }

    #[test]
    fn json_output_includes_dependencies() {
        let temp = TempDir::new().unwrap();
        let cmd = StagesCommand::new(temp.path(), StagesArgs { json: true });
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let rows: serde_json::Value = serde_json::from_str(&ui.data()).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 4);
        assert_eq!(rows[1]["depends_on"], "discovery");
        assert_eq!(rows[2]["depends_on"], "security");
        assert_eq!(rows[2]["alternate"], "generate_security_report");
        assert!(rows[0].get("depends_on").is_none());
    }

    #[test]
    fn broken_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".apiflow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "security: [unclosed").unwrap();
        let cmd = StagesCommand::new(temp.path(), StagesArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert_eq!(ui.errors().len(), 1);
    }
}
