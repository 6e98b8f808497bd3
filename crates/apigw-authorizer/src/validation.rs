// crates/apigw-authorizer/src/validation.rs
// ============================================================================
// Module: Authorizer Validation
// Description: Type-dependent argument rules for authorizer declarations.
// Purpose: Reject invalid declarations before any remote call.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Lambda-backed kinds need an invocation URI and Cognito needs at least one
//! user pool ARN. Messages are user-facing and stable: expected-error steps
//! match them verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::config::AuthorizerDecl;
use crate::model::AuthorizerType;
use crate::model::MAX_AUTHORIZER_TTL;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authorizer declaration errors.
///
/// # Invariants
/// - Display text is stable; expected-error patterns depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizerValidationError {
    /// A Lambda-backed kind is missing its URI.
    #[error("authorizer_uri must be set non-empty when authorizer type is {0}")]
    MissingAuthorizerUri(AuthorizerType),
    /// A Cognito authorizer has no user pools.
    #[error("provider_arns must be set non-empty when authorizer type is COGNITO_USER_POOLS")]
    MissingProviderArns,
    /// The result TTL is outside the accepted range.
    #[error("authorizer_result_ttl_in_seconds must be between 0 and 3600, got {0}")]
    TtlOutOfRange(i64),
    /// The name is empty.
    #[error("name must be set non-empty")]
    MissingName,
}

/// Returns the message an invalid Lambda-backed declaration produces.
#[must_use]
pub fn missing_uri_message(kind: AuthorizerType) -> String {
    AuthorizerValidationError::MissingAuthorizerUri(kind).to_string()
}

/// Returns the message an invalid Cognito declaration produces.
#[must_use]
pub fn missing_provider_arns_message() -> String {
    AuthorizerValidationError::MissingProviderArns.to_string()
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates an authorizer declaration.
///
/// # Errors
///
/// Returns [`AuthorizerValidationError`] for the first violated rule.
pub fn validate_authorizer(decl: &AuthorizerDecl) -> Result<(), AuthorizerValidationError> {
    if decl.name.is_empty() {
        return Err(AuthorizerValidationError::MissingName);
    }
    let kind = decl.effective_type();
    if kind.is_lambda() && decl.authorizer_uri.is_none() {
        return Err(AuthorizerValidationError::MissingAuthorizerUri(kind));
    }
    if kind == AuthorizerType::CognitoUserPools && decl.provider_arns.is_empty() {
        return Err(AuthorizerValidationError::MissingProviderArns);
    }
    if let Some(ttl) = decl.authorizer_result_ttl_in_seconds
        && !(0 ..= MAX_AUTHORIZER_TTL).contains(&ttl)
    {
        return Err(AuthorizerValidationError::TtlOutOfRange(ttl));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
