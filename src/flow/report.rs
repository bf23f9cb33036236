//! Final run report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

use super::artifacts::{DiscoveredItem, DocumentationBundle, SdkBundle, SecurityAssessment};
use super::stage::{StageResult, StageStatus};
use super::state::{FlowState, StageDurations};

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of the state fields a consumer cares about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResults {
    pub discovered_items: Vec<DiscoveredItem>,
    pub item_count: usize,
    pub security_assessment: Option<SecurityAssessment>,
    pub critical_issue_count: u32,
    pub documentation: Option<DocumentationBundle>,
    pub sdk_artifacts: BTreeMap<String, SdkBundle>,
}

/// Aggregated outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub status: RunStatus,

    /// Run-level failure ("cancelled", "deadline_exceeded").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,

    pub execution_time_seconds: f64,

    pub stage_durations: StageDurations,

    pub stages: Vec<StageResult>,

    pub results: ReportResults,
}

impl FlowReport {
    /// Assemble the report from a terminal state.
    ///
    /// Pure over its inputs apart from `execution_time_seconds`, which is
    /// measured from the state's start time at the moment of the call.
    pub fn finalize(state: &FlowState, stages: &[StageResult], run_error: Option<&str>) -> Self {
        let any_failed = stages.iter().any(|s| s.status == StageStatus::Failed);
        let status = if any_failed || run_error.is_some() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        // Never report less wall time than the stages themselves took.
        let durations = state.stage_durations();
        let execution_time_seconds = state.elapsed().as_secs_f64().max(durations.total());

        Self {
            status,
            error: run_error.map(str::to_string),
            started_at: state.start_time(),
            execution_time_seconds,
            stage_durations: durations.clone(),
            stages: stages.to_vec(),
            results: ReportResults {
                discovered_items: state.discovered_items().to_vec(),
                item_count: state.item_count(),
                security_assessment: state.security_assessment().cloned(),
                critical_issue_count: state.critical_issue_count(),
                documentation: state.documentation().cloned(),
                sdk_artifacts: state.sdk_artifacts().clone(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Results of stages that failed.
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageResult> {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Failed)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
