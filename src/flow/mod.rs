//! Stage orchestration.
//!
//! A run walks a [`StageTable`] in order. Before each stage the router
//! decides whether it runs, is skipped, or is replaced by an alternate.
//! Stage outputs are folded into a per-run [`FlowState`], and the terminal
//! state is aggregated into a [`FlowReport`].

pub mod artifacts;
pub mod cancel;
pub mod orchestrator;
pub mod report;
pub mod router;
pub mod stage;
pub mod state;
pub mod table;
pub mod trace;

pub use artifacts::{
    DiscoveredItem, DocumentationBundle, DocumentationVariant, Finding, Recommendation, SdkBundle,
    SecurityAssessment, Severity,
};
pub use cancel::{CancellationToken, HaltReason, RunOptions};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use report::{FlowReport, ReportResults, RunStatus};
pub use router::{route, AlternateStage, RouteDecision, RouterHook, SkipReason};
pub use stage::{Stage, StageName, StageOutput, StageResult, StageStatus};
pub use state::{FlowState, StageDurations};
pub use table::{StageEntry, StageTable};
pub use trace::{LogTraceSink, NoOpTraceSink, RecordingTraceSink, TraceEvent, TraceSink};
