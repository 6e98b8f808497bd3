// crates/apigw-authorizer/src/config/mod.rs
// ============================================================================
// Module: Authorizer Configuration Generator
// Description: Scenario matrix, name seeds, and structured stack declarations.
// Purpose: Produce the configuration documents every case applies.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! [`generate`] turns a [`Scenario`] and a set of [`NameSeeds`] into an
//! [`AuthorizerConfig`]: a structured [`StackDecl`] plus its rendered HCL
//! text. Engines that understand the structure (the simulated backend) read
//! the declaration; engines that only take text (Terraform) read the
//! rendering.
//!
//! Update scenarios reuse the companion addresses of their base scenario so
//! the authorizer is updated in place. The one exception is
//! [`Scenario::CognitoUpdate`], whose user pools live under a different
//! address and are therefore replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use conformance_core::RenderedConfig;
use conformance_core::ResourceAddress;
use conformance_core::random_with_prefix;

use crate::model::AuthorizerType;
use crate::model::authorizer_address;

mod render;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default root of every generated name.
pub const DEFAULT_NAME_ROOT: &str = "tf-acctest";
/// Package path of the backing function, relative to the work directory.
pub const LAMBDA_PACKAGE_PATH: &str = "test-fixtures/lambdatest.zip";
/// Runtime of the backing function.
pub const LAMBDA_RUNTIME: &str = "nodejs20.x";
/// Handler of the backing function.
pub const LAMBDA_HANDLER: &str = "exports.example";
/// Name of the invocation role's inline policy.
pub const INVOCATION_POLICY_NAME: &str = "default";

/// Address of the REST API container.
#[must_use]
pub fn rest_api_address() -> ResourceAddress {
    ResourceAddress::new("aws_api_gateway_rest_api.acctest")
}

/// Address of the role API Gateway assumes to invoke the function.
#[must_use]
pub fn invocation_role_address() -> ResourceAddress {
    ResourceAddress::new("aws_iam_role.invocation_role")
}

/// Address of the invocation role's inline policy.
#[must_use]
pub fn invocation_policy_address() -> ResourceAddress {
    ResourceAddress::new("aws_iam_role_policy.invocation_policy")
}

/// Address of the function's execution role.
#[must_use]
pub fn lambda_role_address() -> ResourceAddress {
    ResourceAddress::new("aws_iam_role.iam_for_lambda")
}

/// Address of the backing function.
#[must_use]
pub fn function_address() -> ResourceAddress {
    ResourceAddress::new("aws_lambda_function.authorizer")
}

/// Address of one counted user pool.
#[must_use]
pub fn user_pool_address(label: &str, index: usize) -> ResourceAddress {
    ResourceAddress::from_parts("aws_cognito_user_pool", label, Some(index))
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Configuration variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Lambda token authorizer with defaults.
    Lambda,
    /// Lambda authorizer renamed with ttl 360 and a validation expression.
    LambdaUpdate,
    /// Lambda authorizer with result caching disabled (ttl 0).
    LambdaNoCache,
    /// Cognito authorizer over two pools.
    Cognito,
    /// Cognito authorizer over three pools at a different address.
    CognitoUpdate,
    /// Default-typed authorizer without a URI.
    InvalidDefaultToken,
    /// Request authorizer without a URI.
    InvalidRequest,
    /// Cognito authorizer without provider ARNs.
    InvalidCognito,
}

impl Scenario {
    /// Every scenario in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Lambda,
        Self::LambdaUpdate,
        Self::LambdaNoCache,
        Self::Cognito,
        Self::CognitoUpdate,
        Self::InvalidDefaultToken,
        Self::InvalidRequest,
        Self::InvalidCognito,
    ];

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lambda => "lambda",
            Self::LambdaUpdate => "lambda-update",
            Self::LambdaNoCache => "lambda-no-cache",
            Self::Cognito => "cognito",
            Self::CognitoUpdate => "cognito-update",
            Self::InvalidDefaultToken => "invalid-default-token",
            Self::InvalidRequest => "invalid-request",
            Self::InvalidCognito => "invalid-cognito",
        }
    }

    /// Parses a label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scenario| scenario.as_str() == label)
    }

    /// Returns true for scenarios that must fail validation.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::InvalidDefaultToken | Self::InvalidRequest | Self::InvalidCognito)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Name Seeds
// ============================================================================

/// Unique names for one case.
///
/// # Invariants
/// - Seeds issued by [`NameSeeds::random`] never repeat within a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSeeds {
    /// REST API name; also prefixes role names.
    pub api_gateway: String,
    /// Authorizer name.
    pub authorizer: String,
    /// Function name.
    pub lambda: String,
    /// User pool name prefix.
    pub cognito: String,
}

impl NameSeeds {
    /// Issues fresh seeds under the default root.
    #[must_use]
    pub fn random() -> Self {
        Self::random_with_root(DEFAULT_NAME_ROOT)
    }

    /// Issues fresh seeds under `root`.
    #[must_use]
    pub fn random_with_root(root: &str) -> Self {
        Self {
            api_gateway: random_with_prefix(&format!("{root}-apigw")),
            authorizer: random_with_prefix(&format!("{root}-igw-authorizer")),
            lambda: random_with_prefix(&format!("{root}-igw-auth-lambda")),
            cognito: random_with_prefix(&format!("{root}-cognito-user-pool")),
        }
    }

    /// Builds deterministic seeds ending in `suffix`, for previews.
    #[must_use]
    pub fn fixed(suffix: &str) -> Self {
        Self {
            api_gateway: format!("{DEFAULT_NAME_ROOT}-apigw-{suffix}"),
            authorizer: format!("{DEFAULT_NAME_ROOT}-igw-authorizer-{suffix}"),
            lambda: format!("{DEFAULT_NAME_ROOT}-igw-auth-lambda-{suffix}"),
            cognito: format!("{DEFAULT_NAME_ROOT}-cognito-user-pool-{suffix}"),
        }
    }
}

// ============================================================================
// SECTION: Declarations
// ============================================================================

/// Reference from the authorizer to a companion attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Invoke ARN of the backing function.
    LambdaInvokeArn,
    /// ARN of the invocation role.
    InvocationRoleArn,
    /// ARN of one counted user pool.
    UserPoolArn {
        /// Pool address label.
        label: String,
        /// Pool index.
        index: usize,
    },
}

impl Reference {
    /// Returns the referenced address.
    #[must_use]
    pub fn address(&self) -> ResourceAddress {
        match self {
            Self::LambdaInvokeArn => function_address(),
            Self::InvocationRoleArn => invocation_role_address(),
            Self::UserPoolArn {
                label,
                index,
            } => user_pool_address(label, *index),
        }
    }

    /// Returns the referenced attribute.
    #[must_use]
    pub const fn attribute(&self) -> &'static str {
        match self {
            Self::LambdaInvokeArn => "invoke_arn",
            Self::InvocationRoleArn | Self::UserPoolArn {
                ..
            } => "arn",
        }
    }

    /// Returns the reference expression, e.g. `aws_lambda_function.authorizer.invoke_arn`.
    #[must_use]
    pub fn expression(&self) -> String {
        format!("{}.{}", self.address(), self.attribute())
    }
}

/// Function and roles backing a Lambda authorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaStack {
    /// Role API Gateway assumes to invoke the function.
    pub invocation_role_name: String,
    /// Execution role of the function.
    pub lambda_role_name: String,
    /// Function name.
    pub function_name: String,
}

/// Counted set of user pools under one address label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPoolSet {
    /// Address label, e.g. `acctest`.
    pub label: String,
    /// Name prefix before the pool index.
    pub name_prefix: String,
    /// Name suffix after the pool index.
    pub name_suffix: String,
    /// Number of pools.
    pub count: usize,
}

impl UserPoolSet {
    /// Returns the concrete pool names in index order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        (0 .. self.count)
            .map(|index| format!("{}-{index}{}", self.name_prefix, self.name_suffix))
            .collect()
    }
}

/// Declared authorizer arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerDecl {
    /// Authorizer name.
    pub name: String,
    /// Declared kind; engines default to [`AuthorizerType::Token`].
    pub authorizer_type: Option<AuthorizerType>,
    /// Lambda invocation URI.
    pub authorizer_uri: Option<Reference>,
    /// Invocation role.
    pub authorizer_credentials: Option<Reference>,
    /// Identity source.
    pub identity_source: Option<String>,
    /// Identity validation expression.
    pub identity_validation_expression: Option<String>,
    /// Result cache TTL in seconds.
    pub authorizer_result_ttl_in_seconds: Option<i64>,
    /// User pool ARNs.
    pub provider_arns: Vec<Reference>,
}

impl AuthorizerDecl {
    /// Creates a declaration with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authorizer_type: None,
            authorizer_uri: None,
            authorizer_credentials: None,
            identity_source: None,
            identity_validation_expression: None,
            authorizer_result_ttl_in_seconds: None,
            provider_arns: Vec::new(),
        }
    }

    /// Returns the effective kind.
    #[must_use]
    pub fn effective_type(&self) -> AuthorizerType {
        self.authorizer_type.unwrap_or(AuthorizerType::Token)
    }
}

/// Companion resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionKind {
    /// REST API container.
    RestApi,
    /// IAM role.
    Role,
    /// Inline IAM role policy.
    RolePolicy,
    /// Lambda function.
    Function,
    /// Cognito user pool.
    UserPool,
}

/// One declared companion resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionDecl {
    /// Resource address.
    pub address: ResourceAddress,
    /// Resource kind.
    pub kind: CompanionKind,
    /// Declared name.
    pub name: String,
    /// Owning resource name (the role of a role policy).
    pub owner: Option<String>,
}

/// Whole declared stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDecl {
    /// REST API name.
    pub rest_api_name: String,
    /// Lambda companions, when declared.
    pub lambda: Option<LambdaStack>,
    /// User pools, when declared.
    pub user_pools: Option<UserPoolSet>,
    /// Authorizer under test.
    pub authorizer: AuthorizerDecl,
}

impl StackDecl {
    /// Returns companions in creation order.
    #[must_use]
    pub fn companions(&self) -> Vec<CompanionDecl> {
        let mut out = vec![CompanionDecl {
            address: rest_api_address(),
            kind: CompanionKind::RestApi,
            name: self.rest_api_name.clone(),
            owner: None,
        }];
        if let Some(lambda) = &self.lambda {
            out.push(CompanionDecl {
                address: invocation_role_address(),
                kind: CompanionKind::Role,
                name: lambda.invocation_role_name.clone(),
                owner: None,
            });
            out.push(CompanionDecl {
                address: lambda_role_address(),
                kind: CompanionKind::Role,
                name: lambda.lambda_role_name.clone(),
                owner: None,
            });
            out.push(CompanionDecl {
                address: function_address(),
                kind: CompanionKind::Function,
                name: lambda.function_name.clone(),
                owner: None,
            });
            out.push(CompanionDecl {
                address: invocation_policy_address(),
                kind: CompanionKind::RolePolicy,
                name: INVOCATION_POLICY_NAME.to_string(),
                owner: Some(lambda.invocation_role_name.clone()),
            });
        }
        if let Some(pools) = &self.user_pools {
            for (index, name) in pools.names().into_iter().enumerate() {
                out.push(CompanionDecl {
                    address: user_pool_address(&pools.label, index),
                    kind: CompanionKind::UserPool,
                    name,
                    owner: None,
                });
            }
        }
        out
    }

    /// Returns every declared address, authorizer last.
    #[must_use]
    pub fn addresses(&self) -> Vec<ResourceAddress> {
        let mut out: Vec<ResourceAddress> =
            self.companions().into_iter().map(|companion| companion.address).collect();
        out.push(authorizer_address());
        out
    }
}

// ============================================================================
// SECTION: Generated Document
// ============================================================================

/// Generated configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Source scenario.
    scenario: Scenario,
    /// Structured declaration.
    stack: StackDecl,
    /// Rendered HCL.
    text: String,
}

impl AuthorizerConfig {
    /// Returns the source scenario.
    #[must_use]
    pub const fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Returns the structured declaration.
    #[must_use]
    pub const fn stack(&self) -> &StackDecl {
        &self.stack
    }

    /// Returns the rendered HCL.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RenderedConfig for AuthorizerConfig {
    fn render(&self) -> &str {
        &self.text
    }

    fn label(&self) -> &str {
        self.scenario.as_str()
    }
}

/// Generates the document for `scenario` from `seeds`.
#[must_use]
pub fn generate(scenario: Scenario, seeds: &NameSeeds) -> AuthorizerConfig {
    let stack = declare(scenario, seeds);
    let text = render::render_stack(&stack);
    AuthorizerConfig {
        scenario,
        stack,
        text,
    }
}

/// Builds the structured declaration for a scenario.
fn declare(scenario: Scenario, seeds: &NameSeeds) -> StackDecl {
    match scenario {
        Scenario::Lambda => lambda_stack(seeds, lambda_authorizer(&seeds.authorizer)),
        Scenario::LambdaUpdate => {
            let mut authorizer = lambda_authorizer(&format!("{}_modified", seeds.authorizer));
            authorizer.authorizer_result_ttl_in_seconds = Some(360);
            authorizer.identity_validation_expression = Some(".*".to_string());
            lambda_stack(seeds, authorizer)
        }
        Scenario::LambdaNoCache => {
            let mut authorizer = lambda_authorizer(&format!("{}_modified", seeds.authorizer));
            authorizer.authorizer_result_ttl_in_seconds = Some(0);
            authorizer.identity_validation_expression = Some(".*".to_string());
            lambda_stack(seeds, authorizer)
        }
        Scenario::Cognito => {
            let pools = user_pools(seeds, "acctest", "", 2);
            let mut authorizer = AuthorizerDecl::named(format!("{}-cognito", seeds.authorizer));
            authorizer.authorizer_type = Some(AuthorizerType::CognitoUserPools);
            authorizer.provider_arns = pool_references(&pools);
            cognito_stack(seeds, pools, authorizer)
        }
        Scenario::CognitoUpdate => {
            let pools = user_pools(seeds, "acctest_update", "-update", 3);
            let mut authorizer =
                AuthorizerDecl::named(format!("{}-cognito-update", seeds.authorizer));
            authorizer.authorizer_type = Some(AuthorizerType::CognitoUserPools);
            authorizer.provider_arns = pool_references(&pools);
            cognito_stack(seeds, pools, authorizer)
        }
        Scenario::InvalidDefaultToken => {
            let mut authorizer = AuthorizerDecl::named(seeds.authorizer.clone());
            authorizer.authorizer_credentials = Some(Reference::InvocationRoleArn);
            lambda_stack(seeds, authorizer)
        }
        Scenario::InvalidRequest => {
            let mut authorizer = AuthorizerDecl::named(seeds.authorizer.clone());
            authorizer.authorizer_type = Some(AuthorizerType::Request);
            authorizer.authorizer_credentials = Some(Reference::InvocationRoleArn);
            lambda_stack(seeds, authorizer)
        }
        Scenario::InvalidCognito => {
            let pools = user_pools(seeds, "acctest", "", 2);
            let mut authorizer = AuthorizerDecl::named(format!("{}-cognito", seeds.authorizer));
            authorizer.authorizer_type = Some(AuthorizerType::CognitoUserPools);
            cognito_stack(seeds, pools, authorizer)
        }
    }
}

/// Lambda authorizer wired to the function and the invocation role.
fn lambda_authorizer(name: &str) -> AuthorizerDecl {
    let mut authorizer = AuthorizerDecl::named(name);
    authorizer.authorizer_uri = Some(Reference::LambdaInvokeArn);
    authorizer.authorizer_credentials = Some(Reference::InvocationRoleArn);
    authorizer
}

/// Stack with Lambda companions.
fn lambda_stack(seeds: &NameSeeds, authorizer: AuthorizerDecl) -> StackDecl {
    StackDecl {
        rest_api_name: seeds.api_gateway.clone(),
        lambda: Some(LambdaStack {
            invocation_role_name: format!("{}_auth_invocation_role", seeds.api_gateway),
            lambda_role_name: format!("{}_authorizer_lambda", seeds.api_gateway),
            function_name: seeds.lambda.clone(),
        }),
        user_pools: None,
        authorizer,
    }
}

/// Stack with user pool companions.
fn cognito_stack(seeds: &NameSeeds, pools: UserPoolSet, authorizer: AuthorizerDecl) -> StackDecl {
    StackDecl {
        rest_api_name: seeds.api_gateway.clone(),
        lambda: None,
        user_pools: Some(pools),
        authorizer,
    }
}

/// Counted pool set.
fn user_pools(seeds: &NameSeeds, label: &str, suffix: &str, count: usize) -> UserPoolSet {
    UserPoolSet {
        label: label.to_string(),
        name_prefix: seeds.cognito.clone(),
        name_suffix: suffix.to_string(),
        count,
    }
}

/// References to every pool's ARN in index order.
fn pool_references(pools: &UserPoolSet) -> Vec<Reference> {
    (0 .. pools.count)
        .map(|index| Reference::UserPoolArn {
            label: pools.label.clone(),
            index,
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
