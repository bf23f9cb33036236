//! The mutable record threaded through one run.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::artifacts::{DiscoveredItem, DocumentationBundle, SdkBundle, SecurityAssessment};
use super::stage::{StageName, StageOutput};

/// Elapsed seconds per executed stage, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageDurations {
    entries: Vec<(StageName, f64)>,
}

impl StageDurations {
    /// Append a timing. A stage already timed keeps its first entry.
    pub(crate) fn record(&mut self, stage: StageName, elapsed: Duration) -> bool {
        if self.contains(stage) {
            return false;
        }
        self.entries.push((stage, elapsed.as_secs_f64()));
        true
    }

    pub fn get(&self, stage: StageName) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, secs)| *secs)
    }

    pub fn contains(&self, stage: StageName) -> bool {
        self.get(stage).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StageName, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Sum of all recorded durations in seconds.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, secs)| secs).sum()
    }
}

impl Serialize for StageDurations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (stage, secs) in &self.entries {
            map.serialize_entry(stage.as_str(), secs)?;
        }
        map.end()
    }
}

/// State shared by all stages of a single run.
///
/// Created fresh per run and owned by the orchestrator. Stages see it
/// read-only; their outputs are folded in with [`FlowState::apply`].
#[derive(Debug, Clone)]
pub struct FlowState {
    discovered_items: Vec<DiscoveredItem>,
    item_count: usize,
    security_assessment: Option<SecurityAssessment>,
    critical_issue_count: u32,
    documentation: Option<DocumentationBundle>,
    sdk_artifacts: BTreeMap<String, SdkBundle>,
    start_time: DateTime<Utc>,
    started: Instant,
    stage_durations: StageDurations,
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowState {
    /// Create an empty state and capture the start time.
    pub fn new() -> Self {
        Self {
            discovered_items: Vec::new(),
            item_count: 0,
            security_assessment: None,
            critical_issue_count: 0,
            documentation: None,
            sdk_artifacts: BTreeMap::new(),
            start_time: Utc::now(),
            started: Instant::now(),
            stage_durations: StageDurations::default(),
        }
    }

    pub fn discovered_items(&self) -> &[DiscoveredItem] {
        &self.discovered_items
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn security_assessment(&self) -> Option<&SecurityAssessment> {
        self.security_assessment.as_ref()
    }

    pub fn critical_issue_count(&self) -> u32 {
        self.critical_issue_count
    }

    pub fn documentation(&self) -> Option<&DocumentationBundle> {
        self.documentation.as_ref()
    }

    pub fn sdk_artifacts(&self) -> &BTreeMap<String, SdkBundle> {
        &self.sdk_artifacts
    }

    /// Wall-clock time the run started.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stage_durations(&self) -> &StageDurations {
        &self.stage_durations
    }

    pub(crate) fn record_duration(&mut self, stage: StageName, elapsed: Duration) -> bool {
        self.stage_durations.record(stage, elapsed)
    }

    /// Fold a stage's output into the fields that stage owns.
    pub fn apply(&mut self, output: StageOutput) {
        match output {
            StageOutput::Discovery { items } => {
                self.item_count = items.len();
                self.discovered_items = items;
            }
            StageOutput::Security { assessment } => {
                self.critical_issue_count = assessment.critical_findings;
                self.security_assessment = Some(assessment);
            }
            StageOutput::Documentation { bundle } => {
                self.documentation = Some(bundle);
            }
            StageOutput::SdkGeneration { artifacts } => {
                self.sdk_artifacts = artifacts;
            }
        }
    }
}
