//! Run command implementation.
//!
//! The `apiflow run` command executes the pipeline and writes its outputs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::RunArgs;
use crate::config::{load_config, validate, FlowConfig};
use crate::error::Result;
use crate::flow::{
    FlowReport, LogTraceSink, NoOpTraceSink, Orchestrator, RunOptions, StageStatus, TraceSink,
};
use crate::output::OutputWriter;
use crate::stages::canonical_table;
use crate::ui::{format_duration, FlowTheme, ProgressTraceSink, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, args: RunArgs) -> Self {
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

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Load configuration and apply command-line overrides on top.
    fn resolve_config(&self) -> Result<FlowConfig> {
        let mut config = load_config(&self.project_root, self.config_path.as_deref())?;
        if !self.args.languages.is_empty() {
            config.sdk.languages = self.args.languages.clone();
        }
        if let Some(deadline) = self.args.deadline {
            config.deadline_seconds = Some(deadline);
        }
        if let Some(output) = &self.args.output {
            config.output.dir = output.clone();
        }
        let repository = &mut config.discovery.repository;
        if repository.enabled {
            repository.path = Some(match repository.path.take() {
                Some(path) if path.is_absolute() => path,
                Some(path) => self.project_root.join(path),
                None => self.project_root.clone(),
            });
        }
        validate(&config)?;
        Ok(config)
    }

    fn output_dir(&self, config: &FlowConfig) -> PathBuf {
        if config.output.dir.is_absolute() {
            config.output.dir.clone()
        } else {
            self.project_root.join(&config.output.dir)
        }
    }

    fn trace_sink(&self, verbose: bool, ui: &dyn UserInterface) -> Arc<dyn TraceSink> {
        if !verbose {
            Arc::new(NoOpTraceSink)
        } else if ui.is_interactive() && !self.args.json {
            Arc::new(ProgressTraceSink::new(FlowTheme::detect(false)))
        } else {
            Arc::new(LogTraceSink)
        }
    }

    fn report_summary(&self, report: &FlowReport, show_stages: bool, ui: &mut dyn UserInterface) {
        if show_stages {
            for stage in &report.stages {
                ui.message(&format!("  {}", stage.summary_line()));
            }
            ui.message("");
        }

        let elapsed = format_duration(Duration::from_secs_f64(report.execution_time_seconds));
        if report.is_success() {
            let ran = report
                .stages
                .iter()
                .filter(|s| s.status == StageStatus::Completed)
                .count();
            let skipped = report.stages.len() - ran;
            let api_label = if report.results.item_count == 1 {
                "API"
            } else {
                "APIs"
            };
            ui.success(&format!(
                "Pipeline complete! ({} {}, {} stages run, {} skipped) in {}",
                report.results.item_count, api_label, ran, skipped, elapsed
            ));
        } else if let Some(reason) = &report.error {
            ui.error(&format!("Pipeline halted: {}", reason));
        } else {
            let failed: Vec<_> = report.failed_stages().map(|s| s.stage_name.as_str()).collect();
            ui.error(&format!("Pipeline failed at: {}", failed.join(", ")));
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match self.resolve_config() {
            Ok(config) => config,
            Err(e) if e.is_config_error() => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };
        let table = match canonical_table(&config) {
            Ok(table) => table,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
        };

        let mode = ui.output_mode();
        let verbose = mode.shows_stage_progress() || (config.verbose && mode.shows_status());
        let options = RunOptions {
            verbose,
            deadline: config.deadline_seconds.map(Duration::from_secs),
            ..Default::default()
        };

        if !self.args.json {
            ui.show_header("apiflow");
        }

        let orchestrator = Orchestrator::new(table)
            .with_sink(self.trace_sink(verbose, &*ui))
            .with_options(options);
        let report = match orchestrator.run() {
            Ok(report) => report,
            Err(e) if e.is_fatal() => {
                ui.error(&format!("Pipeline aborted: {}", e));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if self.args.json {
            ui.data(&report.to_json()?);
        } else {
            self.report_summary(&report, !verbose, ui);
        }

        if !self.args.no_write {
            let dir = self.output_dir(&config);
            let written = OutputWriter::new(&dir).write(&report)?;
            if !self.args.json {
                ui.message(&format!(
                    "Wrote {} files to {}",
                    written.all().len(),
                    dir.display()
                ));
            }
        }

        if report.is_success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
