//! Routing decisions evaluated before each stage.
//!
//! The router is a pure function of the current [`FlowState`] and the stage
//! results recorded so far. It never runs stages itself.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{FlowError, Result};

use super::stage::{StageName, StageResult};
use super::state::FlowState;

/// Why a stage did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Discovery found nothing to assess.
    NoApisFound,
    /// The run was cancelled before this stage.
    Cancelled,
    /// The run deadline elapsed before this stage.
    DeadlineExceeded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoApisFound => "no_apis_found",
            SkipReason::Cancelled => "cancelled",
            SkipReason::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Replacement implementations the router may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternateStage {
    /// Documentation stage that emits a security report.
    GenerateSecurityReport,
}

impl AlternateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlternateStage::GenerateSecurityReport => "generate_security_report",
        }
    }
}

impl fmt::Display for AlternateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlternateStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Router output for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Run,
    Skip(SkipReason),
    RunAlternate(AlternateStage),
}

/// Decision rule attached to a stage table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterHook {
    /// Always run.
    Always,
    /// Skip when discovery found no items.
    SkipWhenNothingDiscovered,
    /// Substitute the security report when critical issues exist.
    BranchOnCriticalIssues,
}

impl RouterHook {
    /// Stage whose output this hook reads.
    pub fn depends_on(&self) -> Option<StageName> {
        match self {
            RouterHook::Always => None,
            RouterHook::SkipWhenNothingDiscovered => Some(StageName::Discovery),
            RouterHook::BranchOnCriticalIssues => Some(StageName::Security),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RouterHook::Always => "always run",
            RouterHook::SkipWhenNothingDiscovered => "skip when no APIs were discovered",
            RouterHook::BranchOnCriticalIssues => {
                "generate security report when critical issues exist"
            }
        }
    }
}

/// Decide whether `stage` runs, is skipped, or is replaced.
///
/// # Errors
///
/// Returns [`FlowError::RoutingAmbiguity`] when the stage the hook depends on
/// has no recorded result yet, meaning the stage order was violated.
pub fn route(
    stage: StageName,
    hook: RouterHook,
    state: &FlowState,
    settled: &[StageResult],
) -> Result<RouteDecision> {
    if let Some(dependency) = hook.depends_on() {
        if !settled.iter().any(|r| r.stage_name == dependency) {
            return Err(FlowError::RoutingAmbiguity {
                stage: stage.to_string(),
                missing: dependency.to_string(),
            });
        }
    }

    let decision = match hook {
        RouterHook::Always => RouteDecision::Run,
        RouterHook::SkipWhenNothingDiscovered => {
            if state.item_count() == 0 {
                RouteDecision::Skip(SkipReason::NoApisFound)
            } else {
                RouteDecision::Run
            }
        }
        // A failed or skipped security stage leaves the count at zero, so the
        // standard documentation runs.
        RouterHook::BranchOnCriticalIssues => {
            if state.critical_issue_count() > 0 {
                RouteDecision::RunAlternate(AlternateStage::GenerateSecurityReport)
            } else {
                RouteDecision::Run
            }
        }
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ScanType;
    use crate::flow::artifacts::{DiscoveredItem, SecurityAssessment};
    use crate::flow::stage::StageOutput;
    use std::time::Duration;

    fn settled(stages: &[StageName]) -> Vec<StageResult> {
        stages
            .iter()
            .map(|s| StageResult::completed(*s, Duration::ZERO, serde_json::Value::Null))
            .collect()
    }

    fn assessment(critical: u32) -> SecurityAssessment {
        SecurityAssessment {
            target: "inventory".to_string(),
            scan_type: ScanType::Comprehensive,
            total_findings: critical,
            critical_findings: critical,
            high_findings: 0,
            medium_findings: 0,
            low_findings: 0,
            passed: critical == 0,
            findings: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn security_skipped_when_nothing_discovered() {
        let mut state = FlowState::new();
        state.apply(StageOutput::Discovery { items: Vec::new() });

        let decision = route(
            StageName::Security,
            RouterHook::SkipWhenNothingDiscovered,
            &state,
            &settled(&[StageName::Discovery]),
        )
        .unwrap();
        assert_eq!(decision, RouteDecision::Skip(SkipReason::NoApisFound));
    }

    #[test]
    fn security_runs_when_items_exist() {
        let mut state = FlowState::new();
        state.apply(StageOutput::Discovery {
            items: vec![DiscoveredItem::new("Auth API", "2.0", "REST")],
        });

        let decision = route(
            StageName::Security,
            RouterHook::SkipWhenNothingDiscovered,
            &state,
            &settled(&[StageName::Discovery]),
        )
        .unwrap();
        assert_eq!(decision, RouteDecision::Run);
    }

    #[test]
    fn any_critical_issue_selects_security_report() {
        for critical in [1, 2, 17] {
            let mut state = FlowState::new();
            state.apply(StageOutput::Security {
                assessment: assessment(critical),
            });

            let decision = route(
                StageName::Documentation,
                RouterHook::BranchOnCriticalIssues,
                &state,
                &settled(&[StageName::Discovery, StageName::Security]),
            )
            .unwrap();
            assert_eq!(
                decision,
                RouteDecision::RunAlternate(AlternateStage::GenerateSecurityReport)
            );
        }
    }

    #[test]
    fn no_critical_issues_runs_standard_documentation() {
        let mut state = FlowState::new();
        state.apply(StageOutput::Security {
            assessment: assessment(0),
        });

        let decision = route(
            StageName::Documentation,
            RouterHook::BranchOnCriticalIssues,
            &state,
            &settled(&[StageName::Discovery, StageName::Security]),
        )
        .unwrap();
        assert_eq!(decision, RouteDecision::Run);
    }

    #[test]
    fn skipped_dependency_still_settles_routing() {
        let state = FlowState::new();
        let records = vec![
            StageResult::completed(StageName::Discovery, Duration::ZERO, serde_json::Value::Null),
            StageResult::skipped(StageName::Security, SkipReason::NoApisFound),
        ];

        let decision = route(
            StageName::Documentation,
            RouterHook::BranchOnCriticalIssues,
            &state,
            &records,
        )
        .unwrap();
        assert_eq!(decision, RouteDecision::Run);
    }

    #[test]
    fn routing_before_dependency_is_ambiguous() {
        let state = FlowState::new();
        let err = route(
            StageName::Security,
            RouterHook::SkipWhenNothingDiscovered,
            &state,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::RoutingAmbiguity { .. }));
    }

    #[test]
    fn always_hook_has_no_dependency() {
        let state = FlowState::new();
        let decision = route(StageName::Discovery, RouterHook::Always, &state, &[]).unwrap();
        assert_eq!(decision, RouteDecision::Run);
    }

    #[test]
    fn reasons_and_variants_render_as_keys() {
        assert_eq!(SkipReason::NoApisFound.to_string(), "no_apis_found");
        assert_eq!(
            AlternateStage::GenerateSecurityReport.to_string(),
            "generate_security_report"
        );
    }
}
