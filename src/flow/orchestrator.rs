//! Drives the stage table for one run.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{FlowError, Result};

use super::cancel::{HaltReason, RunOptions};
use super::report::FlowReport;
use super::router::{route, RouteDecision, SkipReason};
use super::stage::{Stage, StageName, StageResult};
use super::state::FlowState;
use super::table::StageTable;
use super::trace::{NoOpTraceSink, TraceEvent, TraceSink};

/// Everything a run produced, before aggregation into a report.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: FlowState,
    /// One result per table entry, in table order.
    pub stages: Vec<StageResult>,
    /// Set when cancellation or the deadline stopped the run early.
    pub halt: Option<HaltReason>,
}

impl RunOutcome {
    /// Aggregate into the final report. Safe to call repeatedly.
    pub fn finalize(&self) -> FlowReport {
        let halted = self.halt.map(|h| h.into_error().to_string());
        FlowReport::finalize(&self.state, &self.stages, halted.as_deref())
    }
}

/// Runs a [`StageTable`] front to back with routing, timing, and failure capture.
///
/// Stage failures, including panics inside a stage, are recorded and the
/// run continues with the state as it was before the failed stage. Only
/// contract violations (routing before a
/// dependency ran, a missing alternate, a duplicated stage) abort the run.
pub struct Orchestrator {
    table: StageTable,
    sink: Arc<dyn TraceSink>,
    options: RunOptions,
}

impl Orchestrator {
    /// Create an orchestrator with default options and no tracing.
    pub fn new(table: StageTable) -> Self {
        Self {
            table,
            sink: Arc::new(NoOpTraceSink),
            options: RunOptions::default(),
        }
    }

    /// Send trace events to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn table(&self) -> &StageTable {
        &self.table
    }

    /// Run every stage and return the final report.
    ///
    /// # Errors
    ///
    /// Only fatal contract violations are returned as errors; stage failures,
    /// cancellation and deadlines are reported through the report's status.
    pub fn run(&self) -> Result<FlowReport> {
        let outcome = self.execute()?;
        let report = outcome.finalize();
        self.emit(TraceEvent::RunFinished {
            status: report.status,
            elapsed_seconds: report.execution_time_seconds,
        });
        Ok(report)
    }

    /// Run every stage and return the raw outcome.
    pub fn execute(&self) -> Result<RunOutcome> {
        self.check_table()?;

        let mut state = FlowState::new();
        let mut stages: Vec<StageResult> = Vec::with_capacity(self.table.len());
        let mut halt: Option<HaltReason> = None;
        let total = self.table.len();

        self.emit(TraceEvent::RunStarted { total });

        for (index, entry) in self.table.entries().iter().enumerate() {
            if halt.is_none() {
                halt = self.options.halt_reason(state.elapsed());
                if let Some(reason) = halt {
                    self.emit(TraceEvent::RunHalted {
                        reason: reason.as_str().to_string(),
                    });
                }
            }

            if let Some(reason) = halt {
                self.record_skip(&mut stages, entry.name, reason.skip_reason());
                continue;
            }

            let decision = match route(entry.name, entry.hook, &state, &stages) {
                Ok(decision) => decision,
                Err(e) => return Err(self.abort(e)),
            };

            let (stage, variant): (&dyn Stage, _) = match decision {
                RouteDecision::Run => (entry.stage(), None),
                RouteDecision::Skip(reason) => {
                    self.record_skip(&mut stages, entry.name, reason);
                    continue;
                }
                RouteDecision::RunAlternate(variant) => match entry.alternate(variant) {
                    Some(alternate) => (alternate, Some(variant)),
                    None => {
                        return Err(self.abort(FlowError::MissingAlternate {
                            stage: entry.name.to_string(),
                            variant: variant.to_string(),
                        }))
                    }
                },
            };

            self.emit(TraceEvent::StageStarting {
                stage: entry.name,
                index,
                total,
                variant,
            });

            let result = match run_stage(entry.name, stage, &mut state) {
                Ok(result) => result.with_variant(variant),
                Err(e) => return Err(self.abort(e)),
            };

            self.emit(TraceEvent::StageFinished {
                result: result.clone(),
            });
            stages.push(result);
        }

        Ok(RunOutcome {
            state,
            stages,
            halt,
        })
    }

    fn check_table(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in self.table.entries() {
            if !seen.insert(entry.name) {
                return Err(FlowError::ConfigValidationError {
                    message: format!("stage '{}' appears more than once", entry.name),
                });
            }
        }
        Ok(())
    }

    fn record_skip(
        &self,
        stages: &mut Vec<StageResult>,
        stage: StageName,
        reason: SkipReason,
    ) {
        self.emit(TraceEvent::StageSkipped { stage, reason });
        stages.push(StageResult::skipped(stage, reason));
    }

    fn abort(&self, error: FlowError) -> FlowError {
        self.emit(TraceEvent::RunHalted {
            reason: error.to_string(),
        });
        error
    }

    fn emit(&self, event: TraceEvent) {
        if event.is_stage_detail() && !self.options.verbose {
            return;
        }
        self.sink.emit(&event);
    }
}

/// Execute one stage, time it, and fold its output into `state`.
///
/// The state is only touched after the stage returned a complete output
/// owned by `name`; anything else leaves it as it was.
fn run_stage(name: StageName, stage: &dyn Stage, state: &mut FlowState) -> Result<StageResult> {
    let started = Instant::now();
    let snapshot: &FlowState = state;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage.execute(snapshot)));
    let elapsed = started.elapsed();
    state.record_duration(name, elapsed);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = format!("stage panicked: {}", panic_message(payload.as_ref()));
            return Ok(StageResult::failed(name, elapsed, message));
        }
    };

    let result = match outcome {
        Ok(output) if output.owner() != name => StageResult::failed(
            name,
            elapsed,
            format!(
                "stage '{}' returned output owned by '{}'",
                name,
                output.owner()
            ),
        ),
        Ok(output) => match serde_json::to_value(&output) {
            Ok(payload) => {
                state.apply(output);
                StageResult::completed(name, elapsed, payload)
            }
            Err(e) => StageResult::failed(name, elapsed, format!("unserializable output: {}", e)),
        },
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => StageResult::failed(name, elapsed, e.to_string()),
    };

    Ok(result)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
