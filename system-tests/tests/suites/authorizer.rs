// system-tests/tests/suites/authorizer.rs
// =============================================================================
// Module: Authorizer Acceptance Tests
// Description: Run every authorizer suite against simulated and live backends.
// Purpose: Confirm the catalog passes end to end and leaves nothing behind.
// Dependencies: system-tests helpers
// =============================================================================

use apigw_authorizer::SimFaults;
use apigw_authorizer::SuiteName;
use conformance_core::HarnessEventKind;
use helpers::artifacts::TestReporter;
use helpers::runner::Backend;
use helpers::runner::live_config;
use helpers::runner::record_outcome;
use helpers::runner::run_live;
use helpers::runner::run_simulated;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Runs one suite live, or records a skip when the gate is closed.
fn live_suite(suite: SuiteName) -> TestResult {
    let mut reporter = TestReporter::new(&format!("live_{}", suite.as_str()))?;
    let Some(config) = live_config()? else {
        reporter.finish("skip", &["acceptance gate not set; no resources created".to_string()])?;
        return Ok(());
    };
    let outcome = run_live(&[suite], &config)?;
    record_outcome(&mut reporter, Backend::Live, &outcome)?;
    let case = outcome.report.case(suite.as_str()).ok_or("missing case report")?;
    if let Some(failure) = &case.failure {
        return Err(format!("{} failed [{}]: {}", case.case, failure.kind, failure.message).into());
    }
    if !case.cleanup_notes.is_empty() {
        return Err(format!("{} left cleanup notes: {:?}", case.case, case.cleanup_notes).into());
    }
    Ok(())
}

#[test]
fn simulated_catalog_passes_end_to_end() -> TestResult {
    let mut reporter = TestReporter::new("simulated_catalog")?;
    let outcome = run_simulated(&SuiteName::ALL, SimFaults::default())?;
    record_outcome(&mut reporter, Backend::Simulated, &outcome)?;

    assert_eq!(outcome.report.cases.len(), SuiteName::ALL.len());
    for case in &outcome.report.cases {
        assert!(case.passed(), "{} failed: {:?}", case.case, case.failure);
        assert!(case.cleanup_notes.is_empty(), "{}: {:?}", case.case, case.cleanup_notes);
    }
    let kinds = outcome.events.kinds();
    let destroyed = kinds.iter().filter(|kind| **kind == HarnessEventKind::DestroyChecked).count();
    assert_eq!(destroyed, SuiteName::ALL.len());
    assert!(reporter.root().join("report.json").is_file());
    let verdict: serde_json::Value =
        serde_json::from_slice(&std::fs::read(reporter.root().join("summary.json"))?)?;
    assert_eq!(verdict["test"], "simulated_catalog");
    assert_eq!(verdict["status"], "pass");
    assert_eq!(verdict["notes"][0], "backend: simulated");
    Ok(())
}

#[test]
fn simulated_leak_is_reported_by_destroy_check() -> TestResult {
    let mut reporter = TestReporter::new("simulated_leak")?;
    let faults = SimFaults {
        leak_on_destroy: true,
        ..SimFaults::default()
    };
    let outcome = run_simulated(&[SuiteName::Basic], faults)?;
    record_outcome(&mut reporter, Backend::Simulated, &outcome)?;

    let case = outcome.report.case("basic").ok_or("missing case report")?;
    assert!(!case.passed());
    let failure = case.failure.as_ref().ok_or("missing failure")?;
    assert_eq!(failure.step, None);
    Ok(())
}

#[test]
fn live_basic() -> TestResult {
    live_suite(SuiteName::Basic)
}

#[test]
fn live_cognito() -> TestResult {
    live_suite(SuiteName::Cognito)
}

#[test]
fn live_switch_auth_type() -> TestResult {
    live_suite(SuiteName::SwitchAuthType)
}

#[test]
fn live_switch_authorizer_ttl() -> TestResult {
    live_suite(SuiteName::SwitchAuthorizerTtl)
}

#[test]
fn live_auth_type_validation() -> TestResult {
    live_suite(SuiteName::AuthTypeValidation)
}

#[test]
fn live_disappears() -> TestResult {
    live_suite(SuiteName::Disappears)
}
