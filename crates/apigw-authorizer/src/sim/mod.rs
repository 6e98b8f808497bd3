// crates/apigw-authorizer/src/sim/mod.rs
// ============================================================================
// Module: Simulated Cloud
// Description: In-process stand-in for API Gateway, IAM, Lambda, and Cognito.
// Purpose: Run every conformance case without credentials or network access.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! [`SimulatedCloud`] is a shared, lock-protected object store. A
//! [`SimulatedEngine`] plays the declarative engine against it and a
//! [`SimulatedApiGateway`] plays the direct service client. Both handles
//! share the same store, so out-of-band deletes through the client are
//! visible to the engine's next plan.
//!
//! [`SimFaults`] switches on known-bad behaviors. Each fault makes exactly
//! one case fail in a predictable way, which is how the harness itself is
//! tested.
//!
//! # Invariants
//! - Identifiers are never reused within one cloud.
//! - Validation runs before the store is touched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use conformance_core::AttributeMap;
use conformance_core::EngineError;
use conformance_core::TrackedResource;

use crate::config::CompanionDecl;
use crate::config::CompanionKind;
use crate::model::AUTHORIZER_RESOURCE_TYPE;
use crate::model::CONTAINER_ATTRIBUTE;
use crate::model::RemoteAuthorizer;

mod engine;
mod remote;

pub use engine::SimulatedEngine;
pub use remote::SimulatedApiGateway;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Region reported in simulated ARNs.
pub const SIM_REGION: &str = "us-west-2";
/// Account id reported in simulated ARNs.
pub const SIM_ACCOUNT_ID: &str = "123456789012";

/// Resource type label of the REST API container.
const REST_API_TYPE: &str = "aws_api_gateway_rest_api";
/// Resource type label of IAM roles.
const ROLE_TYPE: &str = "aws_iam_role";
/// Resource type label of inline role policies.
const ROLE_POLICY_TYPE: &str = "aws_iam_role_policy";
/// Resource type label of Lambda functions.
const FUNCTION_TYPE: &str = "aws_lambda_function";
/// Resource type label of Cognito user pools.
const USER_POOL_TYPE: &str = "aws_cognito_user_pool";

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Known-bad behaviors the simulated backend can exhibit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimFaults {
    /// The service stores a TTL of 0 as unset.
    pub ttl_zero_as_unset: bool,
    /// Import drops the identity validation expression.
    pub import_drops_validation_expression: bool,
    /// Every authorizer update replaces the object under a new id.
    pub replace_on_update: bool,
    /// Destroy leaves authorizers behind.
    pub leak_on_destroy: bool,
    /// Authorizer reads fail with a transport error once the deployment that
    /// owns their REST API is destroyed. Other deployments are unaffected.
    pub read_error_after_destroy: bool,
    /// The engine accepts declarations that fail validation.
    pub skip_validation: bool,
    /// Plans ignore objects deleted out of band.
    pub ignore_drift: bool,
}

// ============================================================================
// SECTION: Cloud Handle
// ============================================================================

/// Shared handle to one simulated cloud.
#[derive(Debug, Clone, Default)]
pub struct SimulatedCloud {
    /// Lock-protected store.
    inner: Arc<Mutex<CloudState>>,
}

impl SimulatedCloud {
    /// Creates an empty cloud with no faults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cloud exhibiting `faults`.
    #[must_use]
    pub fn with_faults(faults: SimFaults) -> Self {
        let cloud = Self::new();
        cloud.lock().faults = faults;
        cloud
    }

    /// Returns a fresh engine with empty tracked state.
    #[must_use]
    pub fn engine(&self) -> SimulatedEngine {
        SimulatedEngine::new(self.clone())
    }

    /// Returns a direct service client.
    #[must_use]
    pub fn remote(&self) -> SimulatedApiGateway {
        SimulatedApiGateway::new(self.clone())
    }

    /// Returns the number of live authorizers.
    #[must_use]
    pub fn authorizer_count(&self) -> usize {
        self.lock().authorizers.len()
    }

    /// Returns the number of direct authorizer reads served.
    #[must_use]
    pub fn authorizer_reads(&self) -> u64 {
        self.lock().authorizer_reads
    }

    /// Returns the number of live objects of every kind.
    #[must_use]
    pub fn object_count(&self) -> usize {
        let state = self.lock();
        state.rest_apis.len()
            + state.roles.len()
            + state.role_policies.len()
            + state.functions.len()
            + state.user_pools.len()
            + state.authorizers.len()
    }

    /// Locks the store, recovering from a poisoned lock.
    pub(crate) fn lock(&self) -> MutexGuard<'_, CloudState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Every live object in one simulated cloud.
#[derive(Debug, Default)]
pub(crate) struct CloudState {
    /// REST APIs by id, holding their names.
    rest_apis: BTreeMap<String, String>,
    /// Roles by name, holding their ARNs.
    roles: BTreeMap<String, String>,
    /// Inline policies as (role name, policy name).
    role_policies: BTreeSet<(String, String)>,
    /// Functions by name, holding their ARNs.
    functions: BTreeMap<String, String>,
    /// User pools by id, holding their names.
    user_pools: BTreeMap<String, String>,
    /// Authorizers by (REST API id, authorizer id).
    authorizers: BTreeMap<(String, String), RemoteAuthorizer>,
    /// Identifier sequence.
    serial: u64,
    /// Direct authorizer reads served.
    authorizer_reads: u64,
    /// REST API ids whose deployment has been destroyed.
    destroyed_apis: BTreeSet<String>,
    /// Active faults.
    faults: SimFaults,
}

impl CloudState {
    /// Returns the active faults.
    pub(crate) const fn faults(&self) -> SimFaults {
        self.faults
    }

    /// Records that the deployment owning `rest_api_id` was destroyed.
    pub(crate) fn mark_destroyed(&mut self, rest_api_id: &str) {
        self.destroyed_apis.insert(rest_api_id.to_string());
    }

    /// Returns true once the deployment owning `rest_api_id` was destroyed.
    pub(crate) fn is_destroyed(&self, rest_api_id: &str) -> bool {
        self.destroyed_apis.contains(rest_api_id)
    }

    /// Issues the next identifier serial.
    const fn next_serial(&mut self) -> u64 {
        self.serial += 1;
        self.serial
    }

    /// Issues a new authorizer id.
    pub(crate) fn next_authorizer_id(&mut self) -> String {
        format!("{:06x}", self.next_serial())
    }

    /// Creates one companion and returns its tracked record.
    pub(crate) fn create_companion(
        &mut self,
        decl: &CompanionDecl,
    ) -> Result<TrackedResource, EngineError> {
        let mut attributes = AttributeMap::new();
        attributes.insert("name".to_string(), decl.name.clone());
        let id = match decl.kind {
            CompanionKind::RestApi => {
                let id = format!("{:010x}", self.next_serial());
                self.rest_apis.insert(id.clone(), decl.name.clone());
                id
            }
            CompanionKind::Role => {
                if self.roles.contains_key(&decl.name) {
                    return Err(EngineError::Rejected(format!(
                        "Error: EntityAlreadyExists: Role with name {} already exists.",
                        decl.name
                    )));
                }
                let arn = format!("arn:aws:iam::{SIM_ACCOUNT_ID}:role/{}", decl.name);
                self.roles.insert(decl.name.clone(), arn.clone());
                attributes.insert("arn".to_string(), arn);
                decl.name.clone()
            }
            CompanionKind::RolePolicy => {
                let role = decl.owner.clone().unwrap_or_default();
                if !self.roles.contains_key(&role) {
                    return Err(EngineError::Rejected(format!(
                        "Error: NoSuchEntity: The role with name {role} cannot be found."
                    )));
                }
                attributes.insert("role".to_string(), role.clone());
                self.role_policies.insert((role.clone(), decl.name.clone()));
                format!("{role}:{}", decl.name)
            }
            CompanionKind::Function => {
                let arn = format!(
                    "arn:aws:lambda:{SIM_REGION}:{SIM_ACCOUNT_ID}:function:{}",
                    decl.name
                );
                let invoke_arn = format!(
                    "arn:aws:apigateway:{SIM_REGION}:lambda:path/2015-03-31/functions/{arn}/invocations"
                );
                attributes.insert("arn".to_string(), arn.clone());
                attributes.insert("invoke_arn".to_string(), invoke_arn);
                self.functions.insert(decl.name.clone(), arn);
                decl.name.clone()
            }
            CompanionKind::UserPool => {
                let id = format!("{SIM_REGION}_{:09x}", self.next_serial());
                let arn =
                    format!("arn:aws:cognito-idp:{SIM_REGION}:{SIM_ACCOUNT_ID}:userpool/{id}");
                attributes.insert("arn".to_string(), arn);
                self.user_pools.insert(id.clone(), decl.name.clone());
                id
            }
        };
        attributes.insert("id".to_string(), id.clone());
        Ok(TrackedResource::new(decl.address.clone(), id).with_attributes(attributes))
    }

    /// Returns true when the object behind a tracked record is live.
    pub(crate) fn object_exists(&self, resource: &TrackedResource) -> bool {
        match resource.resource_type.as_str() {
            REST_API_TYPE => self.rest_apis.contains_key(&resource.id),
            ROLE_TYPE => self.roles.contains_key(&resource.id),
            ROLE_POLICY_TYPE => resource
                .id
                .split_once(':')
                .is_some_and(|(role, name)| {
                    self.role_policies.contains(&(role.to_string(), name.to_string()))
                }),
            FUNCTION_TYPE => self.functions.contains_key(&resource.id),
            USER_POOL_TYPE => self.user_pools.contains_key(&resource.id),
            AUTHORIZER_RESOURCE_TYPE => self.tracked_authorizer(resource).is_some(),
            _ => false,
        }
    }

    /// Deletes the object behind a tracked record; missing objects are ignored.
    pub(crate) fn delete_object(&mut self, resource: &TrackedResource) {
        match resource.resource_type.as_str() {
            REST_API_TYPE => {
                self.rest_apis.remove(&resource.id);
            }
            ROLE_TYPE => {
                self.roles.remove(&resource.id);
            }
            ROLE_POLICY_TYPE => {
                if let Some((role, name)) = resource.id.split_once(':') {
                    self.role_policies.remove(&(role.to_string(), name.to_string()));
                }
            }
            FUNCTION_TYPE => {
                self.functions.remove(&resource.id);
            }
            USER_POOL_TYPE => {
                self.user_pools.remove(&resource.id);
            }
            AUTHORIZER_RESOURCE_TYPE => {
                if let Some(container) = resource.attribute(CONTAINER_ATTRIBUTE) {
                    self.authorizers.remove(&(container.to_string(), resource.id.clone()));
                }
            }
            _ => {}
        }
    }

    /// Returns the live authorizer behind a tracked record.
    pub(crate) fn tracked_authorizer(&self, resource: &TrackedResource) -> Option<&RemoteAuthorizer> {
        let container = resource.attribute(CONTAINER_ATTRIBUTE)?;
        self.authorizer(container, &resource.id)
    }

    /// Returns a live authorizer.
    pub(crate) fn authorizer(&self, rest_api_id: &str, id: &str) -> Option<&RemoteAuthorizer> {
        self.authorizers.get(&(rest_api_id.to_string(), id.to_string()))
    }

    /// Stores an authorizer, applying the TTL fault, and returns what was stored.
    pub(crate) fn put_authorizer(
        &mut self,
        mut authorizer: RemoteAuthorizer,
    ) -> Result<RemoteAuthorizer, EngineError> {
        if !self.rest_apis.contains_key(&authorizer.rest_api_id) {
            return Err(EngineError::Rejected(format!(
                "Error: NotFoundException: Invalid REST API identifier specified {}",
                authorizer.rest_api_id
            )));
        }
        if self.faults.ttl_zero_as_unset && authorizer.authorizer_result_ttl_in_seconds == Some(0)
        {
            authorizer.authorizer_result_ttl_in_seconds = None;
        }
        let key = (authorizer.rest_api_id.clone(), authorizer.id.clone());
        self.authorizers.insert(key, authorizer.clone());
        Ok(authorizer)
    }

    /// Serves one direct read.
    pub(crate) fn read_authorizer(&mut self, rest_api_id: &str, id: &str) -> Option<RemoteAuthorizer> {
        self.authorizer_reads += 1;
        self.authorizer(rest_api_id, id).cloned()
    }

    /// Removes an authorizer, returning true when it existed.
    pub(crate) fn remove_authorizer(&mut self, rest_api_id: &str, id: &str) -> bool {
        self.authorizers.remove(&(rest_api_id.to_string(), id.to_string())).is_some()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
