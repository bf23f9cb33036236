//! End-to-end pipeline scenarios driven through the library API.

use std::sync::Arc;

use apiflow::collaborators::{CollaboratorError, CollaboratorErrorKind, ScanType};
use apiflow::config::FlowConfig;
use apiflow::flow::{
    route, AlternateStage, CancellationToken, DiscoveredItem, DocumentationVariant, FlowState,
    Orchestrator, RecordingTraceSink, RouteDecision, RouterHook, RunOptions, RunStatus,
    SecurityAssessment, SkipReason, StageName, StageOutput, StageStatus, StageTable, TraceEvent,
};
use apiflow::stages::{
    canonical_table, DiscoveryStage, DocumentationStage, SdkStage, SecurityReportStage,
    SecurityStage,
};
use apiflow::Result;

fn items(names: &[&str]) -> Vec<DiscoveredItem> {
    names
        .iter()
        .map(|name| DiscoveredItem::new(*name, "1.2.0", "REST"))
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

fn discover_three(_: &FlowState) -> Result<StageOutput> {
    Ok(StageOutput::Discovery {
        items: items(&["Orders API", "Billing API", "Search API"]),
    })
}

fn two_critical(_: &FlowState) -> Result<StageOutput> {
    Ok(StageOutput::Security {
        assessment: assessment(2),
    })
}

fn docs_unavailable(_: &FlowState) -> Result<StageOutput> {
    Err(CollaboratorError::new(CollaboratorErrorKind::Network, "docs service unavailable").into())
}

fn config_with(names: &[&str]) -> FlowConfig {
    let mut config = FlowConfig::default();
    config.discovery.inventory = items(names);
    config
}

fn result_for(report: &apiflow::FlowReport, stage: StageName) -> &apiflow::flow::StageResult {
    report
        .stages
        .iter()
        .find(|r| r.stage_name == stage)
        .unwrap()
}

#[test]
fn nothing_discovered_skips_security_and_documents_nothing() {
    let report = Orchestrator::new(canonical_table(&FlowConfig::default()).unwrap())
        .run()
        .unwrap();

    let security = result_for(&report, StageName::Security);
    assert_eq!(security.status, StageStatus::Skipped);
    assert_eq!(security.skip_reason, Some(SkipReason::NoApisFound));

    let docs = result_for(&report, StageName::Documentation);
    assert_eq!(docs.status, StageStatus::Completed);
    assert_eq!(docs.variant, None);
    assert_eq!(
        report.results.documentation.as_ref().unwrap().variant,
        DocumentationVariant::Standard
    );
    assert_eq!(report.results.item_count, 0);
    assert_eq!(report.status, RunStatus::Completed);
}

#[test]
fn critical_issues_switch_documentation_to_security_report() {
    let table = StageTable::canonical(
        discover_three,
        two_critical,
        DocumentationStage::new(),
        SecurityReportStage::new(),
        SdkStage::new(),
    );
    let report = Orchestrator::new(table).run().unwrap();

    let docs = result_for(&report, StageName::Documentation);
    assert_eq!(docs.status, StageStatus::Completed);
    assert_eq!(docs.variant, Some(AlternateStage::GenerateSecurityReport));
    let payload = docs.payload.as_ref().unwrap();
    assert_eq!(payload["type"], "documentation");
    assert_eq!(payload["bundle"]["variant"], "security_report");

    assert_eq!(report.results.critical_issue_count, 2);
    assert!(!report.results.sdk_artifacts.is_empty());
    assert_eq!(report.status, RunStatus::Completed);
}

#[test]
fn clean_inventory_generates_requested_sdks() {
    let mut config = config_with(&["Orders API", "Billing API"]);
    config.sdk.languages = vec!["python".to_string(), "javascript".to_string()];
    let report = Orchestrator::new(canonical_table(&config).unwrap())
        .run()
        .unwrap();

    assert_eq!(report.results.critical_issue_count, 0);
    assert_eq!(
        report.results.documentation.as_ref().unwrap().variant,
        DocumentationVariant::Standard
    );
    let languages: Vec<_> = report.results.sdk_artifacts.keys().cloned().collect();
    assert_eq!(languages, vec!["javascript", "python"]);
    assert_eq!(result_for(&report, StageName::SdkGeneration).status, StageStatus::Completed);
}

#[test]
fn documentation_failure_does_not_stop_sdk_generation() {
    let table = StageTable::canonical(
        discover_three,
        SecurityStage::new(ScanType::Comprehensive),
        docs_unavailable,
        SecurityReportStage::new(),
        SdkStage::new(),
    );
    let report = Orchestrator::new(table).run().unwrap();

    let docs = result_for(&report, StageName::Documentation);
    assert_eq!(docs.status, StageStatus::Failed);
    assert_eq!(
        docs.error.as_deref(),
        Some("network error: docs service unavailable")
    );
    assert_eq!(
        result_for(&report, StageName::SdkGeneration).status,
        StageStatus::Completed
    );
    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.stage_durations.contains(StageName::Documentation));
    assert!(report.stage_durations.contains(StageName::SdkGeneration));
    assert!(report.results.documentation.is_none());
}

#[test]
fn cancellation_between_security_and_documentation() {
    let options = RunOptions::default();
    let token: CancellationToken = options.cancel.clone();
    let security = move |_: &FlowState| -> Result<StageOutput> {
        token.cancel();
        Ok(StageOutput::Security {
            assessment: assessment(0),
        })
    };
    let table = StageTable::canonical(
        discover_three,
        security,
        DocumentationStage::new(),
        SecurityReportStage::new(),
        SdkStage::new(),
    );
    let report = Orchestrator::new(table)
        .with_options(options)
        .run()
        .unwrap();

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.error.as_deref(), Some("cancelled"));
    let timed: Vec<_> = report.stage_durations.iter().map(|(stage, _)| stage).collect();
    assert_eq!(timed, vec![StageName::Discovery, StageName::Security]);
    assert_eq!(
        result_for(&report, StageName::Documentation).skip_reason,
        Some(SkipReason::Cancelled)
    );
    assert!(report.results.sdk_artifacts.is_empty());
}

#[test]
fn routing_is_deterministic() {
    let mut state = FlowState::new();
    state.apply(StageOutput::Discovery {
        items: items(&["Orders API"]),
    });
    let settled = Orchestrator::new(
        StageTable::new().push(apiflow::flow::StageEntry::new(
            StageName::Discovery,
            RouterHook::Always,
            discover_three,
        )),
    )
    .execute()
    .unwrap()
    .stages;

    let first = route(
        StageName::Security,
        RouterHook::SkipWhenNothingDiscovered,
        &state,
        &settled,
    )
    .unwrap();
    let second = route(
        StageName::Security,
        RouterHook::SkipWhenNothingDiscovered,
        &state,
        &settled,
    )
    .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, RouteDecision::Run);
}

#[test]
fn documentation_runs_exactly_one_variant() {
    for critical in [0, 3] {
        let security = move |_: &FlowState| -> Result<StageOutput> {
            Ok(StageOutput::Security {
                assessment: assessment(critical),
            })
        };
        let table = StageTable::canonical(
            discover_three,
            security,
            DocumentationStage::new(),
            SecurityReportStage::new(),
            SdkStage::new(),
        );
        let report = Orchestrator::new(table).run().unwrap();

        let docs: Vec<_> = report
            .stages
            .iter()
            .filter(|r| r.stage_name == StageName::Documentation)
            .collect();
        assert_eq!(docs.len(), 1);
        let expected = if critical > 0 {
            DocumentationVariant::SecurityReport
        } else {
            DocumentationVariant::Standard
        };
        assert_eq!(report.results.documentation.as_ref().unwrap().variant, expected);
    }
}

#[test]
fn every_attempted_stage_is_timed() {
    let table = StageTable::canonical(
        discover_three,
        SecurityStage::new(ScanType::Owasp),
        docs_unavailable,
        SecurityReportStage::new(),
        SdkStage::new(),
    );
    let report = Orchestrator::new(table).run().unwrap();

    for result in &report.stages {
        let timed = report.stage_durations.contains(result.stage_name);
        assert_eq!(timed, result.status != StageStatus::Skipped);
    }
    assert!(report.execution_time_seconds >= report.stage_durations.total());
}

#[test]
fn failed_security_keeps_discovery_output_and_takes_standard_branch() {
    let table = StageTable::canonical(
        discover_three,
        |_: &FlowState| -> Result<StageOutput> {
            Err(CollaboratorError::new(CollaboratorErrorKind::Parse, "bad scanner output").into())
        },
        DocumentationStage::new(),
        SecurityReportStage::new(),
        SdkStage::new(),
    );
    let report = Orchestrator::new(table).run().unwrap();

    assert_eq!(result_for(&report, StageName::Security).status, StageStatus::Failed);
    assert_eq!(report.results.item_count, 3);
    assert!(report.results.security_assessment.is_none());
    assert_eq!(report.results.critical_issue_count, 0);
    assert_eq!(
        report.results.documentation.as_ref().unwrap().variant,
        DocumentationVariant::Standard
    );
}

#[test]
fn finalize_is_idempotent() {
    let outcome = Orchestrator::new(canonical_table(&config_with(&["Orders API"])).unwrap())
        .execute()
        .unwrap();

    let mut first = outcome.finalize();
    let mut second = outcome.finalize();
    first.execution_time_seconds = 0.0;
    second.execution_time_seconds = 0.0;
    assert_eq!(first, second);
}

#[test]
fn verbose_runs_trace_every_stage_in_order() {
    let sink = Arc::new(RecordingTraceSink::new());
    let options = RunOptions {
        verbose: true,
        ..Default::default()
    };
    Orchestrator::new(canonical_table(&FlowConfig::default()).unwrap())
        .with_sink(sink.clone())
        .with_options(options)
        .run()
        .unwrap();

    assert_eq!(
        sink.started_stages(),
        vec![
            StageName::Discovery,
            StageName::Documentation,
            StageName::SdkGeneration
        ]
    );
    let events = sink.events();
    assert!(matches!(events.first(), Some(TraceEvent::RunStarted { total: 4 })));
    assert!(events.contains(&TraceEvent::StageSkipped {
        stage: StageName::Security,
        reason: SkipReason::NoApisFound,
    }));
    assert!(matches!(
        events.last(),
        Some(TraceEvent::RunFinished {
            status: RunStatus::Completed,
            ..
        })
    ));
}

#[test]
fn state_is_not_shared_between_runs() {
    let orchestrator =
        Orchestrator::new(canonical_table(&config_with(&["Orders API"])).unwrap());
    let first = orchestrator.run().unwrap();
    let second = orchestrator.run().unwrap();

    assert_eq!(first.results.item_count, 1);
    assert_eq!(second.results.item_count, 1);
    assert_eq!(first.results.discovered_items, second.results.discovered_items);
    assert_eq!(first.stage_durations.len(), second.stage_durations.len());
}

#[test]
fn discovery_stage_uses_configured_inventory() {
    let table = StageTable::canonical(
        DiscoveryStage::new(items(&["Debug API"])),
        SecurityStage::new(ScanType::Comprehensive),
        DocumentationStage::new(),
        SecurityReportStage::new(),
        SdkStage::new().with_languages(vec!["java".to_string()]),
    );
    let report = Orchestrator::new(table).run().unwrap();

    assert_eq!(report.results.critical_issue_count, 1);
    assert_eq!(
        report.results.documentation.as_ref().unwrap().variant,
        DocumentationVariant::SecurityReport
    );
    assert!(report.results.sdk_artifacts.contains_key("java"));
}
