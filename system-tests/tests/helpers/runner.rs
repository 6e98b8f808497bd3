// system-tests/tests/helpers/runner.rs
// ============================================================================
// Module: Suite Runner Helpers
// Description: Build and run authorizer suites against either backend.
// Purpose: Keep backend wiring and artifact output identical across tests.
// Dependencies: apigw-authorizer, conformance-aws, conformance-config,
//               conformance-core, conformance-terraform
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use apigw_authorizer::AuthorizerConfig;
use apigw_authorizer::NameSeeds;
use apigw_authorizer::SimFaults;
use apigw_authorizer::SimulatedCloud;
use apigw_authorizer::SuiteName;
use apigw_authorizer::build_all;
use apigw_authorizer::config::DEFAULT_NAME_ROOT;
use conformance_aws::ApiGatewayAuthorizerClient;
use conformance_config::ConformanceConfig;
use conformance_config::acceptance_enabled;
use conformance_core::HarnessError;
use conformance_core::HarnessEventSink;
use conformance_core::LifecycleVerifier;
use conformance_core::MemoryEventSink;
use conformance_core::SuiteReport;
use conformance_core::SuiteRunner;
use conformance_core::TestCase;
use conformance_core::VerifierContext;
use conformance_core::VerifierOptions;
use conformance_terraform::TerraformEngine;
use conformance_terraform::TerraformSettings;
use system_tests::config::SystemTestConfig;

use super::artifacts::TestReporter;

/// Fixtures shipped with the authorizer crate.
fn bundled_fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../crates/apigw-authorizer/test-fixtures")
}

/// Backend a suite runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process simulated provider and service.
    Simulated,
    /// Terraform CLI plus the real service.
    Live,
}

impl Backend {
    /// Short label used in artifact notes.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Live => "live",
        }
    }
}

/// Result of a suite run with its captured events.
pub struct SuiteOutcome {
    /// Per-case reports.
    pub report: SuiteReport,
    /// Event stream captured during the run.
    pub events: Arc<MemoryEventSink>,
}

/// Returns the harness config when the acceptance gate is set.
pub fn live_config() -> Result<Option<ConformanceConfig>, String> {
    if !acceptance_enabled().map_err(|err| err.to_string())? {
        return Ok(None);
    }
    let mut config =
        ConformanceConfig::load(None).map_err(|err| format!("failed to load config: {err}"))?;
    if config.terraform.fixtures_dir.is_none() {
        config.terraform.fixtures_dir = Some(bundled_fixtures());
    }
    Ok(Some(config))
}

/// Builds the cases for `suites` with names under the configured root.
pub fn build_cases(
    suites: &[SuiteName],
    config: &ConformanceConfig,
) -> Result<Vec<TestCase<AuthorizerConfig>>, String> {
    let env = SystemTestConfig::load()?;
    let root = env
        .name_root
        .or_else(|| config.harness.name_prefix.clone())
        .unwrap_or_else(|| DEFAULT_NAME_ROOT.to_string());
    build_all(suites, || NameSeeds::random_with_root(&root)).map_err(|err| err.to_string())
}

/// Runs `suites` against the simulated backend with `faults` applied.
pub fn run_simulated(
    suites: &[SuiteName],
    faults: SimFaults,
) -> Result<SuiteOutcome, String> {
    let config = ConformanceConfig::default();
    let cases = build_cases(suites, &config)?;
    let memory = Arc::new(MemoryEventSink::new());
    let events: Arc<dyn HarnessEventSink> = memory.clone();
    let cloud = SimulatedCloud::with_faults(faults);
    let report = SuiteRunner::new(config.harness.parallelism).run(&cases, |_| {
        let ctx = VerifierContext::new(cloud.engine(), cloud.remote(), Arc::clone(&events));
        Ok(LifecycleVerifier::new(ctx))
    });
    Ok(SuiteOutcome {
        report,
        events: memory,
    })
}

/// Runs `suites` through Terraform against the configured account.
pub fn run_live(suites: &[SuiteName], config: &ConformanceConfig) -> Result<SuiteOutcome, String> {
    let cases = build_cases(suites, config)?;
    let remote = ApiGatewayAuthorizerClient::new(&config.aws)
        .map_err(|err| format!("failed to build API Gateway client: {err}"))?;
    let settings = TerraformSettings::from_config(config);
    let options = VerifierOptions {
        destroy_check: config.harness.destroy_check,
    };
    let memory = Arc::new(MemoryEventSink::new());
    let events: Arc<dyn HarnessEventSink> = memory.clone();
    let report = SuiteRunner::new(config.harness.parallelism).run(&cases, |_| {
        let engine = TerraformEngine::<AuthorizerConfig>::new(settings.clone())
            .map_err(|err| HarnessError::Engine(err.into()))?;
        let ctx = VerifierContext::new(engine, remote.clone(), Arc::clone(&events))
            .with_options(options);
        Ok(LifecycleVerifier::new(ctx))
    });
    Ok(SuiteOutcome {
        report,
        events: memory,
    })
}

/// Writes the report and events, then finishes the reporter with a verdict.
pub fn record_outcome(
    reporter: &mut TestReporter,
    backend: Backend,
    outcome: &SuiteOutcome,
) -> Result<(), String> {
    reporter.write_json("report.json", &outcome.report).map_err(|err| err.to_string())?;
    reporter.write_json("events.json", &outcome.events.events()).map_err(|err| err.to_string())?;
    let mut notes = vec![format!("backend: {}", backend.label())];
    for case in &outcome.report.cases {
        let verdict = if case.passed() { "passed" } else { "failed" };
        notes.push(format!("{} {verdict} in {} ms", case.case, case.duration_ms));
        if let Some(failure) = &case.failure {
            notes.push(format!("{} [{}]: {}", case.case, failure.kind, failure.message));
        }
        notes.extend(case.cleanup_notes.iter().map(|note| format!("{} cleanup: {note}", case.case)));
    }
    let status = if outcome.report.is_success() { "pass" } else { "fail" };
    reporter.finish(status, &notes).map_err(|err| err.to_string())
}
