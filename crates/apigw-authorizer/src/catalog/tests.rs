// crates/apigw-authorizer/src/catalog/tests.rs
// ============================================================================
// Module: Case Catalog Tests
// Description: Unit tests for case layout and expectation patterns.
// Purpose: Pin the step sequence of every case.
// Dependencies: apigw-authorizer, conformance-core
// ============================================================================

//! ## Overview
//! Checks case structure only; execution is covered by integration tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use conformance_core::Expected;
use conformance_core::LifecycleStep;
use conformance_core::PlanExpectation;

use super::SuiteName;
use super::build_all;
use super::build_case;
use super::expected_invocation_role;
use super::expected_invoke_uri;
use crate::config::NameSeeds;
use crate::config::Scenario;

fn seeds() -> NameSeeds {
    NameSeeds::fixed("cat")
}

fn kinds(suite: SuiteName) -> Vec<&'static str> {
    build_case(suite, &seeds()).unwrap().steps.iter().map(LifecycleStep::kind_label).collect()
}

#[test]
fn suite_names_round_trip() {
    for suite in SuiteName::ALL {
        assert_eq!(SuiteName::parse(suite.as_str()), Some(suite));
        assert_eq!(build_case(suite, &seeds()).unwrap().name, suite.as_str());
    }
    assert_eq!(SuiteName::parse("nope"), None);
}

#[test]
fn step_sequences_match_the_case_definitions() {
    assert_eq!(kinds(SuiteName::Basic), vec!["apply", "import", "apply"]);
    assert_eq!(kinds(SuiteName::Cognito), vec!["apply", "import", "apply"]);
    assert_eq!(kinds(SuiteName::SwitchAuthType), vec!["apply", "import", "apply", "apply"]);
    assert_eq!(kinds(SuiteName::SwitchAuthorizerTtl), vec![
        "apply", "import", "apply", "apply", "apply"
    ]);
    assert_eq!(kinds(SuiteName::AuthTypeValidation), vec![
        "expect_error",
        "expect_error",
        "expect_error"
    ]);
    assert_eq!(kinds(SuiteName::Disappears), vec!["apply"]);
}

#[test]
fn ttl_case_walks_the_scenarios_in_order() {
    let case = build_case(SuiteName::SwitchAuthorizerTtl, &seeds()).unwrap();
    let scenarios: Vec<Scenario> = case
        .steps
        .iter()
        .filter_map(|step| match step {
            LifecycleStep::Apply {
                config, ..
            } => Some(config.scenario()),
            _ => None,
        })
        .collect();
    assert_eq!(scenarios, vec![
        Scenario::Lambda,
        Scenario::LambdaUpdate,
        Scenario::LambdaNoCache,
        Scenario::Lambda
    ]);
}

#[test]
fn disappears_expects_a_non_empty_plan() {
    let case = build_case(SuiteName::Disappears, &seeds()).unwrap();
    let LifecycleStep::Apply {
        plan, ..
    } = &case.steps[0]
    else {
        panic!("disappears must start with an apply step");
    };
    assert_eq!(*plan, PlanExpectation::NonEmpty);
}

#[test]
fn validation_patterns_match_engine_messages_literally() {
    let case = build_case(SuiteName::AuthTypeValidation, &seeds()).unwrap();
    let LifecycleStep::ExpectError {
        pattern, ..
    } = &case.steps[2]
    else {
        panic!("validation steps must expect errors");
    };
    assert!(pattern.is_match(
        "Error: provider_arns must be set non-empty when authorizer type is COGNITO_USER_POOLS"
    ));
    assert!(!pattern.is_match("provider_arns must be set"));
}

#[test]
fn arn_patterns_are_anchored_to_seeded_names() {
    let seeds = seeds();
    let uri = expected_invoke_uri(&seeds).unwrap();
    let good = format!(
        "arn:aws:apigateway:us-west-2:lambda:path/2015-03-31/functions/arn:aws:lambda:us-west-2:123456789012:function:{}/invocations",
        seeds.lambda
    );
    assert!(uri.matches(Some(good.as_str())));
    assert!(!uri.matches(Some(format!("{good}x").as_str())));
    assert!(!uri.matches(None));

    let role = expected_invocation_role(&seeds).unwrap();
    let arn = format!("arn:aws:iam::123456789012:role/{}_auth_invocation_role", seeds.api_gateway);
    assert!(role.matches(Some(arn.as_str())));
    assert!(!role.matches(Some("arn:aws:iam::123456789012:role/other_auth_invocation_role")));
    assert_ne!(role, Expected::exact(arn));
}

#[test]
fn build_all_issues_fresh_seeds_per_case() {
    let mut issued = 0;
    let cases = build_all(&SuiteName::ALL, || {
        issued += 1;
        NameSeeds::fixed(&issued.to_string())
    })
    .unwrap();
    assert_eq!(cases.len(), SuiteName::ALL.len());
    assert_eq!(issued, SuiteName::ALL.len());
}
