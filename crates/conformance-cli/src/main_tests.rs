// crates/conformance-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and report rendering.
// Purpose: Ensure run options resolve correctly and reports stay readable.
// Dependencies: conformance-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises argument parsers, parallelism resolution, suite selection,
//! fault mapping, and text rendering of case reports. Also runs a small
//! simulated suite through the same path `run` uses.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use apigw_authorizer::NameSeeds;
use apigw_authorizer::Scenario;
use apigw_authorizer::SuiteName;
use apigw_authorizer::build_all;
use clap::Parser;
use conformance_config::ConformanceConfig;
use conformance_core::CaseReport;
use conformance_core::CaseStatus;
use conformance_core::FailureRecord;
use conformance_core::HarnessEventSink;
use conformance_core::MemoryEventSink;
use conformance_core::VerifierOptions;

use super::Backend;
use super::Cli;
use super::Commands;
use super::FaultArg;
use super::faults_from_args;
use super::parse_scenario;
use super::parse_suite;
use super::render_case_text;
use super::resolve_parallelism;
use super::run_simulated;
use super::select_suites;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn failed_case(step: Option<usize>) -> CaseReport {
    CaseReport {
        case: "switch-authorizer-ttl".to_string(),
        status: CaseStatus::Failed,
        failure: Some(FailureRecord {
            step,
            kind: "assertion",
            message: "remote attribute authorizer_result_ttl_in_seconds mismatched".to_string(),
        }),
        steps: Vec::new(),
        cleanup_notes: vec!["destroy failed: timeout".to_string()],
        duration_ms: 12,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn parsers_accept_known_names_and_list_alternatives() {
    assert_eq!(parse_suite("switch-auth-type").unwrap(), SuiteName::SwitchAuthType);
    assert_eq!(parse_scenario("cognito-update").unwrap(), Scenario::CognitoUpdate);
    let err = parse_suite("everything").unwrap_err();
    assert!(err.contains("basic"));
    assert!(err.contains("disappears"));
    assert!(parse_scenario("lambda-v2").unwrap_err().contains("invalid-cognito"));
}

#[test]
fn run_arguments_parse_repeated_suites_and_faults() {
    let cli = Cli::try_parse_from([
        "authorizer-conformance",
        "run",
        "--suite",
        "basic",
        "--suite",
        "cognito",
        "--fault",
        "ttl-zero-as-unset",
        "--format",
        "json",
    ])
    .unwrap();
    let Some(Commands::Run(command)) = cli.command else {
        panic!("expected the run command");
    };
    assert_eq!(command.suites, vec![SuiteName::Basic, SuiteName::Cognito]);
    assert_eq!(command.backend, Backend::Simulated);
    assert_eq!(command.faults, vec![FaultArg::TtlZeroAsUnset]);
    assert!(Cli::try_parse_from(["authorizer-conformance", "run", "--suite", "nope"]).is_err());
}

#[test]
fn parallelism_prefers_flag_and_enforces_bounds() {
    let config = ConformanceConfig::from_toml_str("[harness]\nparallelism = 3\n").unwrap();
    assert_eq!(resolve_parallelism(None, &config).unwrap(), 3);
    assert_eq!(resolve_parallelism(Some(8), &config).unwrap(), 8);
    assert!(resolve_parallelism(Some(0), &config).is_err());
    assert!(resolve_parallelism(Some(65), &config).is_err());
}

#[test]
fn suite_selection_defaults_to_all_and_dedupes() {
    assert_eq!(select_suites(&[]), SuiteName::ALL.to_vec());
    let picked =
        select_suites(&[SuiteName::Disappears, SuiteName::Basic, SuiteName::Disappears]);
    assert_eq!(picked, vec![SuiteName::Disappears, SuiteName::Basic]);
}

#[test]
fn fault_flags_map_to_backend_faults() {
    let faults = faults_from_args(&[FaultArg::LeakOnDestroy, FaultArg::IgnoreDrift]);
    assert!(faults.leak_on_destroy);
    assert!(faults.ignore_drift);
    assert!(!faults.ttl_zero_as_unset);
    assert!(!faults.skip_validation);
}

#[test]
fn failed_case_text_names_step_kind_and_cleanup() {
    let lines = render_case_text(&failed_case(Some(2)));
    assert_eq!(lines[0], "FAIL switch-authorizer-ttl (12 ms)");
    assert!(lines[1].starts_with("  step 2 [assertion]: "));
    assert_eq!(lines[2], "  cleanup: destroy failed: timeout");

    let teardown = render_case_text(&failed_case(None));
    assert!(teardown[1].starts_with("  teardown [assertion]"));
}

#[test]
fn simulated_run_reports_every_case() {
    let suites = [SuiteName::Basic, SuiteName::SwitchAuthorizerTtl];
    let cases = build_all(&suites, NameSeeds::random).unwrap();
    let memory = Arc::new(MemoryEventSink::new());
    let events: Arc<dyn HarnessEventSink> = memory.clone();
    let report = run_simulated(&cases, 2, faults_from_args(&[]), &events, VerifierOptions::default());
    assert!(report.is_success());
    assert_eq!(report.passed(), 2);
    assert!(!memory.events().is_empty());

    let faulty = faults_from_args(&[FaultArg::TtlZeroAsUnset]);
    let report = run_simulated(&cases, 2, faulty, &events, VerifierOptions::default());
    assert_eq!(report.failed(), 1);
    assert!(!report.case("switch-authorizer-ttl").unwrap().passed());
}
