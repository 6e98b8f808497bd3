// crates/apigw-authorizer/tests/fault_injection.rs
// ============================================================================
// Module: Fault Injection Tests
// Description: Proves each case detects the defect it exists to catch.
// ============================================================================
//! ## Overview
//! Each test switches on one simulated fault and asserts that the matching
//! case fails with the expected failure kind, step, and attribute.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use apigw_authorizer::AuthorizerConfig;
use apigw_authorizer::NameSeeds;
use apigw_authorizer::Scenario;
use apigw_authorizer::SimFaults;
use apigw_authorizer::SimulatedCloud;
use apigw_authorizer::SuiteName;
use apigw_authorizer::authorizer_address;
use apigw_authorizer::build_case;
use apigw_authorizer::generate;
use conformance_core::CaseReport;
use conformance_core::CaseStatus;
use conformance_core::FailureRecord;
use conformance_core::LifecycleStep;
use conformance_core::LifecycleVerifier;
use conformance_core::NoopEventSink;
use conformance_core::StepStatus;
use conformance_core::TestCase;
use conformance_core::VerifierContext;

fn run_with(faults: SimFaults, suite: SuiteName) -> CaseReport {
    let cloud = SimulatedCloud::with_faults(faults);
    let case = build_case(suite, &NameSeeds::random()).unwrap();
    let ctx = VerifierContext::new(cloud.engine(), cloud.remote(), Arc::new(NoopEventSink));
    LifecycleVerifier::new(ctx).run_case(&case)
}

fn failure(report: &CaseReport) -> &FailureRecord {
    assert_eq!(report.status, CaseStatus::Failed, "{} should fail", report.case);
    report.failure.as_ref().unwrap()
}

#[test]
fn ttl_zero_stored_as_unset_fails_remote_ttl_check() {
    let report = run_with(
        SimFaults {
            ttl_zero_as_unset: true,
            ..SimFaults::default()
        },
        SuiteName::SwitchAuthorizerTtl,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "assertion");
    assert_eq!(failure.step, Some(3));
    assert!(failure.message.contains("authorizer_result_ttl_in_seconds"));
    assert!(failure.message.contains("<absent>"));
    assert_eq!(report.steps[4].status, StepStatus::Skipped);
}

#[test]
fn import_dropping_expression_fails_round_trip() {
    let report = run_with(
        SimFaults {
            import_drops_validation_expression: true,
            ..SimFaults::default()
        },
        SuiteName::Basic,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "import_mismatch");
    assert_eq!(failure.step, Some(1));
    assert!(failure.message.contains("identity_validation_expression"));
}

#[test]
fn import_ignore_list_skips_only_the_named_attribute() {
    let faults = SimFaults {
        import_drops_validation_expression: true,
        ..SimFaults::default()
    };
    let seeds = NameSeeds::random();
    let config = generate(Scenario::LambdaUpdate, &seeds);
    let case = |import: LifecycleStep<AuthorizerConfig>| {
        TestCase::new("import-ignore")
            .step(LifecycleStep::apply(config.clone(), Vec::new()))
            .step(import)
    };
    let run = |case: &TestCase<AuthorizerConfig>| {
        let cloud = SimulatedCloud::with_faults(faults);
        let ctx = VerifierContext::new(cloud.engine(), cloud.remote(), Arc::new(NoopEventSink));
        LifecycleVerifier::new(ctx).run_case(case)
    };

    let ignoring = run(&case(LifecycleStep::import_ignoring(
        authorizer_address(),
        vec!["identity_validation_expression".to_string()],
    )));
    assert!(ignoring.passed(), "{:?}", ignoring.failure);

    let unrelated = run(&case(LifecycleStep::import_ignoring(
        authorizer_address(),
        vec!["identity_source".to_string()],
    )));
    assert_eq!(failure(&unrelated).kind, "import_mismatch");
    assert!(failure(&unrelated).message.contains("identity_validation_expression"));
}

#[test]
fn replace_on_update_breaks_stable_id() {
    let report = run_with(
        SimFaults {
            replace_on_update: true,
            ..SimFaults::default()
        },
        SuiteName::SwitchAuthorizerTtl,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "assertion");
    assert_eq!(failure.step, Some(2));
    assert!(failure.message.contains("id"));
}

#[test]
fn leaked_authorizer_fails_destroy_check() {
    let report = run_with(
        SimFaults {
            leak_on_destroy: true,
            ..SimFaults::default()
        },
        SuiteName::Basic,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "still_exists");
    assert_eq!(failure.step, None);
    assert!(report.steps.iter().all(|step| step.status == StepStatus::Passed));
}

#[test]
fn read_errors_after_destroy_are_not_treated_as_gone() {
    let report = run_with(
        SimFaults {
            read_error_after_destroy: true,
            ..SimFaults::default()
        },
        SuiteName::Disappears,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "remote");
    assert_eq!(failure.step, None);
}

#[test]
fn accepted_invalid_declaration_fails_expected_error_step() {
    let report = run_with(
        SimFaults {
            skip_validation: true,
            ..SimFaults::default()
        },
        SuiteName::AuthTypeValidation,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "expected_error");
    assert_eq!(failure.step, Some(0));
    assert!(failure.message.contains("applied cleanly"));
}

#[test]
fn ignored_drift_fails_disappears_plan_check() {
    let report = run_with(
        SimFaults {
            ignore_drift: true,
            ..SimFaults::default()
        },
        SuiteName::Disappears,
    );
    let failure = failure(&report);
    assert_eq!(failure.kind, "unexpected_plan");
    assert_eq!(failure.step, Some(0));
}

#[test]
fn faults_leave_unrelated_cases_passing() {
    let faults = SimFaults {
        ttl_zero_as_unset: true,
        ignore_drift: true,
        ..SimFaults::default()
    };
    for suite in [SuiteName::Basic, SuiteName::Cognito, SuiteName::AuthTypeValidation] {
        let report = run_with(faults, suite);
        assert!(report.passed(), "{suite} should pass");
    }
}
