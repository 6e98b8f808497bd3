// crates/apigw-authorizer/src/model.rs
// ============================================================================
// Module: Authorizer Model
// Description: Remote authorizer shape, authorizer types, and defaults.
// Purpose: Describe the live object and how engines record it.
// Dependencies: conformance-core, serde
// ============================================================================

//! ## Overview
//! [`RemoteAuthorizer`] is the live object read straight from the service.
//! Optional fields stay `None` when the service omits them, so remote checks
//! can tell "unset" from "empty". [`tracked_attributes`] renders the same
//! object the way an engine records it in tracked state, where unset strings
//! become empty strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use conformance_core::AttributeMap;
use conformance_core::RemoteObject;
use conformance_core::ResourceAddress;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource type label of the authorizer.
pub const AUTHORIZER_RESOURCE_TYPE: &str = "aws_api_gateway_authorizer";
/// Tracked attribute holding the owning REST API id.
pub const CONTAINER_ATTRIBUTE: &str = "rest_api_id";
/// Identity source applied when none is declared.
pub const DEFAULT_IDENTITY_SOURCE: &str = "method.request.header.Authorization";
/// Result cache TTL applied when none is declared.
pub const DEFAULT_AUTHORIZER_TTL: i64 = 300;
/// Largest accepted result cache TTL.
pub const MAX_AUTHORIZER_TTL: i64 = 3600;

/// Address of the authorizer under test.
#[must_use]
pub fn authorizer_address() -> ResourceAddress {
    ResourceAddress::new("aws_api_gateway_authorizer.acctest")
}

// ============================================================================
// SECTION: Authorizer Type
// ============================================================================

/// Authorizer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizerType {
    /// Lambda authorizer reading a single token.
    #[serde(rename = "TOKEN")]
    Token,
    /// Lambda authorizer reading request parameters.
    #[serde(rename = "REQUEST")]
    Request,
    /// Cognito user pool authorizer.
    #[serde(rename = "COGNITO_USER_POOLS")]
    CognitoUserPools,
}

impl AuthorizerType {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "TOKEN",
            Self::Request => "REQUEST",
            Self::CognitoUserPools => "COGNITO_USER_POOLS",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "TOKEN" => Some(Self::Token),
            "REQUEST" => Some(Self::Request),
            "COGNITO_USER_POOLS" => Some(Self::CognitoUserPools),
            _ => None,
        }
    }

    /// Returns true for Lambda-backed kinds.
    #[must_use]
    pub const fn is_lambda(self) -> bool {
        matches!(self, Self::Token | Self::Request)
    }
}

impl fmt::Display for AuthorizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Remote Authorizer
// ============================================================================

/// Live authorizer as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteAuthorizer {
    /// Authorizer id.
    pub id: String,
    /// Owning REST API id.
    pub rest_api_id: String,
    /// Authorizer name.
    pub name: Option<String>,
    /// Authorizer kind.
    pub authorizer_type: Option<AuthorizerType>,
    /// Lambda invocation URI.
    pub authorizer_uri: Option<String>,
    /// Role assumed to invoke the Lambda.
    pub authorizer_credentials: Option<String>,
    /// Request location of the identity.
    pub identity_source: Option<String>,
    /// Pattern the identity must match.
    pub identity_validation_expression: Option<String>,
    /// Result cache TTL in seconds.
    pub authorizer_result_ttl_in_seconds: Option<i64>,
    /// Cognito user pool ARNs in declared order.
    pub provider_arns: Vec<String>,
}

impl RemoteObject for RemoteAuthorizer {
    fn attributes(&self) -> AttributeMap {
        let mut out = AttributeMap::new();
        out.insert("id".to_string(), self.id.clone());
        out.insert(CONTAINER_ATTRIBUTE.to_string(), self.rest_api_id.clone());
        let optional = [
            ("name", self.name.clone()),
            ("type", self.authorizer_type.map(|kind| kind.as_str().to_string())),
            ("authorizer_uri", self.authorizer_uri.clone()),
            ("authorizer_credentials", self.authorizer_credentials.clone()),
            ("identity_source", self.identity_source.clone()),
            ("identity_validation_expression", self.identity_validation_expression.clone()),
            (
                "authorizer_result_ttl_in_seconds",
                self.authorizer_result_ttl_in_seconds.map(|ttl| ttl.to_string()),
            ),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                out.insert(key.to_string(), value);
            }
        }
        insert_list(&mut out, "provider_arns", &self.provider_arns);
        out
    }
}

/// Renders a live authorizer the way an engine records it in tracked state.
///
/// Unset strings become empty strings and an unset TTL becomes `0`.
#[must_use]
pub fn tracked_attributes(remote: &RemoteAuthorizer) -> AttributeMap {
    let mut out = AttributeMap::new();
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    out.insert("id".to_string(), remote.id.clone());
    out.insert(CONTAINER_ATTRIBUTE.to_string(), remote.rest_api_id.clone());
    out.insert("name".to_string(), text(&remote.name));
    out.insert(
        "type".to_string(),
        remote.authorizer_type.map(|kind| kind.as_str().to_string()).unwrap_or_default(),
    );
    out.insert("authorizer_uri".to_string(), text(&remote.authorizer_uri));
    out.insert("authorizer_credentials".to_string(), text(&remote.authorizer_credentials));
    out.insert("identity_source".to_string(), text(&remote.identity_source));
    out.insert(
        "identity_validation_expression".to_string(),
        text(&remote.identity_validation_expression),
    );
    out.insert(
        "authorizer_result_ttl_in_seconds".to_string(),
        remote.authorizer_result_ttl_in_seconds.unwrap_or(0).to_string(),
    );
    insert_list(&mut out, "provider_arns", &remote.provider_arns);
    out
}

/// Writes a list with its `.#` count and indexed entries.
fn insert_list(out: &mut AttributeMap, key: &str, items: &[String]) {
    out.insert(format!("{key}.#"), items.len().to_string());
    for (index, item) in items.iter().enumerate() {
        out.insert(format!("{key}.{index}"), item.clone());
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
