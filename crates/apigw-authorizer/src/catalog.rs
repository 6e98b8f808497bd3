// crates/apigw-authorizer/src/catalog.rs
// ============================================================================
// Module: Authorizer Case Catalog
// Description: The lifecycle cases that define authorizer conformance.
// Purpose: Build backend-independent test cases from fresh name seeds.
// Dependencies: conformance-core, regex
// ============================================================================

//! ## Overview
//! Each [`SuiteName`] maps to one [`TestCase`]. Cases only describe steps
//! and expectations; the same case runs against the simulated backend and
//! against live Terraform plus the AWS API.
//!
//! Expectations differ between tracked state and the remote object where the
//! two legitimately disagree: an unset validation expression is an empty
//! string in tracked state and missing remotely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use conformance_core::AttrPattern;
use conformance_core::Check;
use conformance_core::Expected;
use conformance_core::ExpectedAttributes;
use conformance_core::LifecycleStep;
use conformance_core::PatternError;
use conformance_core::TestCase;

use crate::config::AuthorizerConfig;
use crate::config::NameSeeds;
use crate::config::Scenario;
use crate::config::generate;
use crate::model::AuthorizerType;
use crate::model::DEFAULT_AUTHORIZER_TTL;
use crate::model::DEFAULT_IDENTITY_SOURCE;
use crate::model::authorizer_address;
use crate::validation::missing_provider_arns_message;
use crate::validation::missing_uri_message;

// ============================================================================
// SECTION: Suite Names
// ============================================================================

/// Authorizer conformance cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteName {
    /// Create, import, and update a Lambda authorizer.
    Basic,
    /// Create, import, and replace the pools of a Cognito authorizer.
    Cognito,
    /// Switch TOKEN to COGNITO and back.
    SwitchAuthType,
    /// Walk the result TTL through 300, 360, 0, and 300.
    SwitchAuthorizerTtl,
    /// Reject invalid declarations with user-facing messages.
    AuthTypeValidation,
    /// Detect out-of-band deletion.
    Disappears,
}

impl SuiteName {
    /// Every case in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Basic,
        Self::Cognito,
        Self::SwitchAuthType,
        Self::SwitchAuthorizerTtl,
        Self::AuthTypeValidation,
        Self::Disappears,
    ];

    /// Returns the stable case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Cognito => "cognito",
            Self::SwitchAuthType => "switch-auth-type",
            Self::SwitchAuthorizerTtl => "switch-authorizer-ttl",
            Self::AuthTypeValidation => "auth-type-validation",
            Self::Disappears => "disappears",
        }
    }

    /// Parses a case name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|suite| suite.as_str() == name)
    }

    /// Returns a one-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Basic => "create, import, and update a Lambda token authorizer",
            Self::Cognito => "create, import, and update a Cognito authorizer",
            Self::SwitchAuthType => "switch TOKEN -> COGNITO_USER_POOLS -> TOKEN in place",
            Self::SwitchAuthorizerTtl => "walk the result TTL through 300, 360, 0, and 300",
            Self::AuthTypeValidation => "reject declarations missing type-specific arguments",
            Self::Disappears => "detect out-of-band deletion and plan recreation",
        }
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Case Builders
// ============================================================================

/// Builds the case for `suite` from `seeds`.
///
/// # Errors
///
/// Returns [`PatternError`] when a name seed yields an invalid pattern.
pub fn build_case(
    suite: SuiteName,
    seeds: &NameSeeds,
) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    match suite {
        SuiteName::Basic => basic(seeds),
        SuiteName::Cognito => cognito(seeds),
        SuiteName::SwitchAuthType => switch_auth_type(seeds),
        SuiteName::SwitchAuthorizerTtl => switch_authorizer_ttl(seeds),
        SuiteName::AuthTypeValidation => auth_type_validation(seeds),
        SuiteName::Disappears => Ok(disappears(seeds)),
    }
}

/// Builds every case, each from its own fresh seeds.
///
/// # Errors
///
/// Returns [`PatternError`] when a name seed yields an invalid pattern.
pub fn build_all(
    suites: &[SuiteName],
    mut seeds: impl FnMut() -> NameSeeds,
) -> Result<Vec<TestCase<AuthorizerConfig>>, PatternError> {
    suites.iter().map(|suite| build_case(*suite, &seeds())).collect()
}

/// Pattern of the invoke URI of the seeded function.
///
/// # Errors
///
/// Returns [`PatternError`] when the pattern does not compile.
pub fn expected_invoke_uri(seeds: &NameSeeds) -> Result<Expected, PatternError> {
    Expected::pattern(&format!(
        "^arn:aws:apigateway:[a-z0-9-]+:lambda:path/2015-03-31/functions/arn:aws:lambda:[a-z0-9-]+:[0-9]{{12}}:function:{}/invocations$",
        regex::escape(&seeds.lambda)
    ))
}

/// Pattern of the seeded invocation role ARN.
///
/// # Errors
///
/// Returns [`PatternError`] when the pattern does not compile.
pub fn expected_invocation_role(seeds: &NameSeeds) -> Result<Expected, PatternError> {
    Expected::pattern(&format!(
        "^arn:aws:iam::[0-9]{{12}}:role/{}_auth_invocation_role$",
        regex::escape(&seeds.api_gateway)
    ))
}

/// Expectations for a Lambda token authorizer, as (tracked, remote).
fn lambda_expectations(
    seeds: &NameSeeds,
    name: &str,
    ttl: i64,
    validation_expression: Option<&str>,
) -> Result<(ExpectedAttributes, ExpectedAttributes), PatternError> {
    let shared = ExpectedAttributes::new()
        .with("name", Expected::exact(name))
        .with("type", Expected::exact(AuthorizerType::Token.as_str()))
        .with("authorizer_uri", expected_invoke_uri(seeds)?)
        .with("authorizer_credentials", expected_invocation_role(seeds)?)
        .with("identity_source", Expected::exact(DEFAULT_IDENTITY_SOURCE))
        .with("authorizer_result_ttl_in_seconds", Expected::exact(ttl.to_string()));
    let tracked = shared
        .clone()
        .with("identity_validation_expression", Expected::exact(validation_expression.unwrap_or("")));
    let remote = shared
        .with("identity_validation_expression", Expected::from_option(validation_expression));
    Ok((tracked, remote))
}

/// Expectations for a Cognito authorizer over `pools` pools, as (tracked, remote).
fn cognito_expectations(
    name: &str,
    pools: usize,
) -> Result<(ExpectedAttributes, ExpectedAttributes), PatternError> {
    let shared = ExpectedAttributes::new()
        .with("name", Expected::exact(name))
        .with("type", Expected::exact(AuthorizerType::CognitoUserPools.as_str()))
        .with("provider_arns.#", Expected::exact(pools.to_string()));
    let tracked = shared.clone().with("authorizer_uri", Expected::exact(""));
    let remote = shared
        .with("authorizer_uri", Expected::Absent)
        .with(
            "provider_arns.0",
            Expected::pattern("^arn:aws:cognito-idp:[a-z0-9-]+:[0-9]{12}:userpool/.+$")?,
        );
    Ok((tracked, remote))
}

/// Existence plus every tracked and remote expectation.
fn full_checks(tracked: &ExpectedAttributes, remote: &ExpectedAttributes) -> Vec<Check> {
    let address = authorizer_address();
    let mut checks = vec![Check::exists(address.clone())];
    checks.extend(Check::tracked_all(&address, tracked));
    checks.extend(Check::remote_all(&address, remote));
    checks
}

/// Lambda create, import, then rename with ttl 360 and an expression.
fn basic(seeds: &NameSeeds) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    let (tracked, remote) = lambda_expectations(seeds, &seeds.authorizer, DEFAULT_AUTHORIZER_TTL, None)?;
    let mut create = full_checks(&tracked, &remote);
    create.push(Check::stable_id(authorizer_address()));

    let updated_name = format!("{}_modified", seeds.authorizer);
    let (tracked, remote) = lambda_expectations(seeds, &updated_name, 360, Some(".*"))?;
    let mut update = full_checks(&tracked, &remote);
    update.push(Check::stable_id(authorizer_address()));

    Ok(TestCase::new(SuiteName::Basic.as_str())
        .step(LifecycleStep::apply(generate(Scenario::Lambda, seeds), create))
        .step(LifecycleStep::import(authorizer_address()))
        .step(LifecycleStep::apply(generate(Scenario::LambdaUpdate, seeds), update)))
}

/// Cognito create over two pools, import, then three pools at a new address.
fn cognito(seeds: &NameSeeds) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    let (tracked, remote) = cognito_expectations(&format!("{}-cognito", seeds.authorizer), 2)?;
    let create = full_checks(&tracked, &remote);
    let (tracked, remote) =
        cognito_expectations(&format!("{}-cognito-update", seeds.authorizer), 3)?;
    let update = full_checks(&tracked, &remote);

    Ok(TestCase::new(SuiteName::Cognito.as_str())
        .step(LifecycleStep::apply(generate(Scenario::Cognito, seeds), create))
        .step(LifecycleStep::import(authorizer_address()))
        .step(LifecycleStep::apply(generate(Scenario::CognitoUpdate, seeds), update)))
}

/// TOKEN, import, COGNITO, then TOKEN again.
fn switch_auth_type(seeds: &NameSeeds) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    let address = authorizer_address();
    let (tracked, remote) = lambda_expectations(seeds, &seeds.authorizer, DEFAULT_AUTHORIZER_TTL, None)?;
    let token = full_checks(&tracked, &remote);

    let (tracked, remote) = cognito_expectations(&format!("{}-cognito", seeds.authorizer), 2)?;
    let cognito = full_checks(&tracked, &remote);

    let updated_name = format!("{}_modified", seeds.authorizer);
    let (tracked, remote) = lambda_expectations(seeds, &updated_name, 360, Some(".*"))?;
    let mut back = full_checks(&tracked, &remote);
    back.push(Check::tracked(address.clone(), "provider_arns.#", Expected::exact("0")));
    back.push(Check::remote(address.clone(), "provider_arns.#", Expected::exact("0")));

    Ok(TestCase::new(SuiteName::SwitchAuthType.as_str())
        .step(LifecycleStep::apply(generate(Scenario::Lambda, seeds), token))
        .step(LifecycleStep::import(address))
        .step(LifecycleStep::apply(generate(Scenario::Cognito, seeds), cognito))
        .step(LifecycleStep::apply(generate(Scenario::LambdaUpdate, seeds), back)))
}

/// TTL 300 (default), import, 360, 0, then back to 300.
fn switch_authorizer_ttl(seeds: &NameSeeds) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    let address = authorizer_address();
    let ttl_checks = |ttl: &str| {
        vec![
            Check::exists(address.clone()),
            Check::stable_id(address.clone()),
            Check::tracked(address.clone(), "authorizer_result_ttl_in_seconds", Expected::exact(ttl)),
            Check::remote(address.clone(), "authorizer_result_ttl_in_seconds", Expected::exact(ttl)),
        ]
    };
    Ok(TestCase::new(SuiteName::SwitchAuthorizerTtl.as_str())
        .step(LifecycleStep::apply(generate(Scenario::Lambda, seeds), ttl_checks("300")))
        .step(LifecycleStep::import(address.clone()))
        .step(LifecycleStep::apply(generate(Scenario::LambdaUpdate, seeds), ttl_checks("360")))
        .step(LifecycleStep::apply(generate(Scenario::LambdaNoCache, seeds), ttl_checks("0")))
        .step(LifecycleStep::apply(generate(Scenario::Lambda, seeds), ttl_checks("300"))))
}

/// Three invalid declarations, each rejected with its own message.
fn auth_type_validation(seeds: &NameSeeds) -> Result<TestCase<AuthorizerConfig>, PatternError> {
    let literal = |message: String| AttrPattern::new(&regex::escape(&message));
    Ok(TestCase::new(SuiteName::AuthTypeValidation.as_str())
        .step(LifecycleStep::expect_error(
            generate(Scenario::InvalidDefaultToken, seeds),
            literal(missing_uri_message(AuthorizerType::Token))?,
        ))
        .step(LifecycleStep::expect_error(
            generate(Scenario::InvalidRequest, seeds),
            literal(missing_uri_message(AuthorizerType::Request))?,
        ))
        .step(LifecycleStep::expect_error(
            generate(Scenario::InvalidCognito, seeds),
            literal(missing_provider_arns_message())?,
        )))
}

/// Lambda create, out-of-band delete, and a plan that recreates it.
fn disappears(seeds: &NameSeeds) -> TestCase<AuthorizerConfig> {
    let address = authorizer_address();
    TestCase::new(SuiteName::Disappears.as_str()).step(LifecycleStep::apply_expecting_drift(
        generate(Scenario::Lambda, seeds),
        vec![Check::exists(address.clone()), Check::disappears(address)],
    ))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
