//! Stage identity, outputs, and results.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::Result;

use super::artifacts::{DiscoveredItem, DocumentationBundle, SdkBundle, SecurityAssessment};
use super::router::{AlternateStage, SkipReason};
use super::state::FlowState;

/// Canonical pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageName {
    Discovery,
    Security,
    Documentation,
    SdkGeneration,
}

impl StageName {
    /// All stages in their fixed order.
    pub const CANONICAL: [StageName; 4] = [
        StageName::Discovery,
        StageName::Security,
        StageName::Documentation,
        StageName::SdkGeneration,
    ];

    /// Stable key used in reports and `stage_durations`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Discovery => "discovery",
            StageName::Security => "security",
            StageName::Documentation => "documentation",
            StageName::SdkGeneration => "sdk_generation",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Status of a stage in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage is waiting to run.
    Pending,

    /// Stage is currently executing.
    Running,

    /// Stage produced its output.
    Completed,

    /// Stage returned an error; state was left untouched.
    Failed,

    /// Router decided not to run the stage.
    Skipped,
}

impl StageStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageStatus::Completed | StageStatus::Failed | StageStatus::Skipped
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StageStatus::Pending => '○',
            StageStatus::Running => '◉',
            StageStatus::Completed => '✓',
            StageStatus::Failed => '✗',
            StageStatus::Skipped => '⊘',
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
            StageStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// What a stage hands back to the orchestrator.
///
/// Each variant carries exactly the fields owned by one stage; the
/// orchestrator applies it to [`FlowState`] only after the stage returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageOutput {
    Discovery {
        items: Vec<DiscoveredItem>,
    },
    Security {
        assessment: SecurityAssessment,
    },
    Documentation {
        bundle: DocumentationBundle,
    },
    SdkGeneration {
        artifacts: BTreeMap<String, SdkBundle>,
    },
}

impl StageOutput {
    /// The stage allowed to produce this output.
    pub fn owner(&self) -> StageName {
        match self {
            StageOutput::Discovery { .. } => StageName::Discovery,
            StageOutput::Security { .. } => StageName::Security,
            StageOutput::Documentation { .. } => StageName::Documentation,
            StageOutput::SdkGeneration { .. } => StageName::SdkGeneration,
        }
    }
}

/// A single pipeline step.
///
/// Implementations read what earlier stages put in `state` and return their
/// own output. Collaborator failures should be returned as errors; the
/// orchestrator records them as a failed stage and carries on.
pub trait Stage: Send + Sync {
    fn execute(&self, state: &FlowState) -> Result<StageOutput>;
}

impl<F> Stage for F
where
    F: Fn(&FlowState) -> Result<StageOutput> + Send + Sync,
{
    fn execute(&self, state: &FlowState) -> Result<StageOutput> {
        self(state)
    }
}

/// Result of one stage in a run. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub stage_name: StageName,

    pub status: StageStatus,

    /// Wall time spent in the stage; zero when skipped.
    pub duration_seconds: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Set when the router substituted an alternate implementation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<AlternateStage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl StageResult {
    /// Create a completed result.
    pub fn completed(stage: StageName, duration: Duration, payload: serde_json::Value) -> Self {
        Self {
            stage_name: stage,
            status: StageStatus::Completed,
            duration_seconds: duration.as_secs_f64(),
            skip_reason: None,
            error: None,
            variant: None,
            payload: Some(payload),
        }
    }

    /// Create a failed result.
    pub fn failed(stage: StageName, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            stage_name: stage,
            status: StageStatus::Failed,
            duration_seconds: duration.as_secs_f64(),
            skip_reason: None,
            error: Some(error.into()),
            variant: None,
            payload: None,
        }
    }

    /// Create a skipped result.
    pub fn skipped(stage: StageName, reason: SkipReason) -> Self {
        Self {
            stage_name: stage,
            status: StageStatus::Skipped,
            duration_seconds: 0.0,
            skip_reason: Some(reason),
            error: None,
            variant: None,
            payload: None,
        }
    }

    /// Mark the result as produced by an alternate implementation.
    pub fn with_variant(mut self, variant: Option<AlternateStage>) -> Self {
        self.variant = variant;
        self
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let mark = self.status.display_char();
        let label = match self.variant {
            Some(variant) => format!("{} [{}]", self.stage_name, variant),
            None => self.stage_name.to_string(),
        };

        match self.status {
            StageStatus::Completed => format!("{} {} ({:.2}s)", mark, label, self.duration_seconds),
            StageStatus::Skipped => {
                let reason = self.skip_reason.map(|r| r.as_str()).unwrap_or("skipped");
                format!("{} {} ({})", mark, label, reason)
            }
            StageStatus::Failed => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", mark, label, error)
            }
            _ => format!("{} {}", mark, label),
        }
    }
}
