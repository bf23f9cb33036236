//! Trace events emitted by the orchestrator.
//!
//! The orchestrator never logs on its own; it reports progress to an
//! injected [`TraceSink`]. Use [`NoOpTraceSink`] to discard events,
//! [`LogTraceSink`] to forward them to `tracing`, or [`RecordingTraceSink`]
//! to capture them for assertions.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::report::RunStatus;
use super::router::{AlternateStage, SkipReason};
use super::stage::{StageName, StageResult, StageStatus};

/// Progress events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// The run began.
    RunStarted { total: usize },
    /// A stage is about to execute.
    StageStarting {
        stage: StageName,
        index: usize,
        total: usize,
        variant: Option<AlternateStage>,
    },
    /// A stage finished (completed or failed).
    StageFinished { result: StageResult },
    /// The router skipped a stage, or the run halted before it.
    StageSkipped { stage: StageName, reason: SkipReason },
    /// The run stopped before its last stage.
    RunHalted { reason: String },
    /// The run finished; `elapsed_seconds` covers the whole run.
    RunFinished {
        status: RunStatus,
        elapsed_seconds: f64,
    },
}

impl TraceEvent {
    /// Per-stage events are only emitted in verbose mode.
    pub fn is_stage_detail(&self) -> bool {
        matches!(
            self,
            TraceEvent::StageStarting { .. }
                | TraceEvent::StageFinished { .. }
                | TraceEvent::StageSkipped { .. }
        )
    }
}

/// Receiver for trace events.
pub trait TraceSink: Send + Sync {
    fn emit(&self, event: &TraceEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTraceSink;

impl TraceSink for NoOpTraceSink {
    fn emit(&self, _event: &TraceEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn emit(&self, event: &TraceEvent) {
        match event {
            TraceEvent::RunStarted { total } => info!("Starting pipeline with {} stages", total),
            TraceEvent::StageStarting {
                stage,
                index,
                total,
                variant,
            } => match variant {
                Some(variant) => info!("[{}/{}] {} ({})", index + 1, total, stage, variant),
                None => info!("[{}/{}] {}", index + 1, total, stage),
            },
            TraceEvent::StageFinished { result } => match result.status {
                StageStatus::Failed => warn!("{}", result.summary_line()),
                _ => info!("{}", result.summary_line()),
            },
            TraceEvent::StageSkipped { stage, reason } => {
                warn!("Skipping {}: {}", stage, reason)
            }
            TraceEvent::RunHalted { reason } => warn!("Run halted: {}", reason),
            TraceEvent::RunFinished {
                status,
                elapsed_seconds,
            } => info!("Run {} in {:.2}s", status, elapsed_seconds),
        }
        debug!(?event, "trace event");
    }
}

/// Captures events for later assertion.
#[derive(Debug, Default)]
pub struct RecordingTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Names of stages that received a `StageStarting` event.
    pub fn started_stages(&self) -> Vec<StageName> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TraceEvent::StageStarting { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl TraceSink for RecordingTraceSink {
    fn emit(&self, event: &TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
