// crates/apigw-authorizer/src/sim/engine.rs
// ============================================================================
// Module: Simulated Engine
// Description: Declarative engine over the simulated cloud.
// Purpose: Apply, plan, import, and destroy authorizer stacks in process.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! The engine reads the structured [`StackDecl`] of each document. Apply
//! refreshes tracked state, converges companions, converges the authorizer,
//! and prunes anything no longer declared. Plan compares the same
//! declaration against live objects without changing anything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::CompositeId;
use conformance_core::DeclarativeEngine;
use conformance_core::EngineError;
use conformance_core::PlanAction;
use conformance_core::PlanSummary;
use conformance_core::PlannedChange;
use conformance_core::ResourceAddress;
use conformance_core::TrackedResource;
use conformance_core::TrackedState;

use super::CloudState;
use super::FUNCTION_TYPE;
use super::ROLE_POLICY_TYPE;
use super::REST_API_TYPE;
use super::ROLE_TYPE;
use super::SimulatedCloud;
use super::USER_POOL_TYPE;
use crate::config::AuthorizerConfig;
use crate::config::AuthorizerDecl;
use crate::config::CompanionDecl;
use crate::config::Reference;
use crate::config::StackDecl;
use crate::config::rest_api_address;
use crate::model::AUTHORIZER_RESOURCE_TYPE;
use crate::model::DEFAULT_AUTHORIZER_TTL;
use crate::model::DEFAULT_IDENTITY_SOURCE;
use crate::model::RemoteAuthorizer;
use crate::model::authorizer_address;
use crate::model::tracked_attributes;
use crate::validation::validate_authorizer;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Declarative engine backed by a [`SimulatedCloud`].
///
/// # Invariants
/// - Tracked state only holds objects this engine created or imported.
#[derive(Debug)]
pub struct SimulatedEngine {
    /// Shared cloud.
    cloud: SimulatedCloud,
    /// Tracked state.
    state: TrackedState,
}

impl SimulatedEngine {
    /// Creates an engine with empty tracked state.
    #[must_use]
    pub const fn new(cloud: SimulatedCloud) -> Self {
        Self {
            cloud,
            state: TrackedState::new(),
        }
    }
}

impl DeclarativeEngine for SimulatedEngine {
    type Document = AuthorizerConfig;

    fn apply(&mut self, document: &AuthorizerConfig) -> Result<(), EngineError> {
        let stack = document.stack();
        let mut cloud = self.cloud.lock();
        if !cloud.faults().skip_validation {
            validate_stack(stack)?;
        }
        refresh(&mut self.state, &cloud);
        for companion in stack.companions() {
            ensure_companion(&mut self.state, &mut cloud, &companion)?;
        }
        ensure_authorizer(&mut self.state, &mut cloud, &stack.authorizer)?;
        prune(&mut self.state, &mut cloud, &stack.addresses());
        Ok(())
    }

    fn plan(&mut self, document: &AuthorizerConfig) -> Result<PlanSummary, EngineError> {
        let stack = document.stack();
        let cloud = self.cloud.lock();
        if !cloud.faults().skip_validation {
            validate_stack(stack)?;
        }
        let ignore_drift = cloud.faults().ignore_drift;
        let live = |resource: &TrackedResource| ignore_drift || cloud.object_exists(resource);
        let mut changes = Vec::new();
        for companion in stack.companions() {
            let action = match self.state.get(&companion.address) {
                Some(tracked) if live(tracked) => {
                    (tracked_name(tracked) != Some(companion.name.as_str()))
                        .then_some(PlanAction::Replace)
                }
                _ => Some(PlanAction::Create),
            };
            if let Some(action) = action {
                changes.push(PlannedChange {
                    address: companion.address,
                    action,
                });
            }
        }
        let address = authorizer_address();
        let action = match self.state.get(&address) {
            Some(tracked) if live(tracked) => cloud.tracked_authorizer(tracked).and_then(|current| {
                let desired = desired_authorizer(
                    &self.state,
                    &stack.authorizer,
                    &current.rest_api_id,
                    &current.id,
                );
                let converged = desired.is_ok_and(|desired| {
                    tracked_attributes(&desired) == tracked_attributes(current)
                });
                (!converged).then_some(PlanAction::Update)
            }),
            _ => Some(PlanAction::Create),
        };
        if let Some(action) = action {
            changes.push(PlannedChange {
                address,
                action,
            });
        }
        let declared = stack.addresses();
        for tracked in self.state.addresses() {
            if !declared.contains(&tracked) {
                changes.push(PlannedChange {
                    address: tracked,
                    action: PlanAction::Delete,
                });
            }
        }
        Ok(PlanSummary {
            changes,
        })
    }

    fn import(
        &mut self,
        _document: &AuthorizerConfig,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<TrackedResource, EngineError> {
        if address.resource_type() != AUTHORIZER_RESOURCE_TYPE {
            return Err(EngineError::Rejected(format!(
                "Error: resource {address} does not support import"
            )));
        }
        let id = CompositeId::parse(import_id)
            .map_err(|err| EngineError::Rejected(format!("Error: {err}")))?;
        let cloud = self.cloud.lock();
        let remote = cloud.authorizer(id.container_id(), id.object_id()).ok_or_else(|| {
            EngineError::Rejected("Error: Cannot import non-existent remote object".to_string())
        })?;
        let mut attributes = tracked_attributes(remote);
        if cloud.faults().import_drops_validation_expression {
            attributes.remove("identity_validation_expression");
        }
        Ok(TrackedResource::new(address.clone(), remote.id.clone()).with_attributes(attributes))
    }

    fn destroy(&mut self) -> Result<(), EngineError> {
        let mut cloud = self.cloud.lock();
        let leak = cloud.faults().leak_on_destroy;
        let mut resources: Vec<TrackedResource> = self.state.iter().cloned().collect();
        resources.sort_by_key(|resource| destroy_rank(&resource.resource_type));
        for resource in &resources {
            if leak && resource.resource_type == AUTHORIZER_RESOURCE_TYPE {
                continue;
            }
            cloud.delete_object(resource);
        }
        for resource in resources.iter().filter(|resource| resource.resource_type == REST_API_TYPE) {
            cloud.mark_destroyed(&resource.id);
        }
        self.state.clear();
        Ok(())
    }

    fn state(&self) -> &TrackedState {
        &self.state
    }
}

// ============================================================================
// SECTION: Convergence
// ============================================================================

/// Validates a stack, formatting failures the way engines report them.
fn validate_stack(stack: &StackDecl) -> Result<(), EngineError> {
    validate_authorizer(&stack.authorizer)
        .map_err(|err| EngineError::Rejected(format!("Error: {err}")))
}

/// Drops tracked records whose objects vanished and refreshes the authorizer.
fn refresh(state: &mut TrackedState, cloud: &CloudState) {
    for resource in state.iter().cloned().collect::<Vec<_>>() {
        if resource.resource_type == AUTHORIZER_RESOURCE_TYPE {
            match cloud.tracked_authorizer(&resource) {
                Some(live) => {
                    state.insert(resource.with_attributes(tracked_attributes(live)));
                }
                None => {
                    state.remove(&resource.address);
                }
            }
        } else if !cloud.object_exists(&resource) {
            state.remove(&resource.address);
        }
    }
}

/// Creates a companion, or replaces it when its name changed.
fn ensure_companion(
    state: &mut TrackedState,
    cloud: &mut CloudState,
    decl: &CompanionDecl,
) -> Result<(), EngineError> {
    if let Some(existing) = state.get(&decl.address) {
        if tracked_name(existing) == Some(decl.name.as_str()) {
            return Ok(());
        }
        let existing = existing.clone();
        cloud.delete_object(&existing);
        state.remove(&decl.address);
    }
    let created = cloud.create_companion(decl)?;
    state.insert(created);
    Ok(())
}

/// Creates, updates, or replaces the authorizer.
fn ensure_authorizer(
    state: &mut TrackedState,
    cloud: &mut CloudState,
    decl: &AuthorizerDecl,
) -> Result<(), EngineError> {
    let address = authorizer_address();
    let rest_api_id = state
        .get(&rest_api_address())
        .map(|resource| resource.id.clone())
        .ok_or_else(|| EngineError::Rejected("Error: REST API is not tracked".to_string()))?;
    let current = state
        .get(&address)
        .and_then(|tracked| cloud.tracked_authorizer(tracked))
        .cloned();
    let stored = match current {
        Some(current) if current.rest_api_id == rest_api_id => {
            let desired = desired_authorizer(state, decl, &rest_api_id, &current.id)?;
            if tracked_attributes(&desired) == tracked_attributes(&current) {
                current
            } else if cloud.faults().replace_on_update {
                cloud.remove_authorizer(&current.rest_api_id, &current.id);
                let id = cloud.next_authorizer_id();
                cloud.put_authorizer(RemoteAuthorizer {
                    id,
                    ..desired
                })?
            } else {
                cloud.put_authorizer(desired)?
            }
        }
        current => {
            if let Some(current) = current {
                cloud.remove_authorizer(&current.rest_api_id, &current.id);
            }
            let id = cloud.next_authorizer_id();
            let desired = desired_authorizer(state, decl, &rest_api_id, &id)?;
            cloud.put_authorizer(desired)?
        }
    };
    let tracked = TrackedResource::new(address, stored.id.clone())
        .with_attributes(tracked_attributes(&stored));
    state.insert(tracked);
    Ok(())
}

/// Deletes tracked resources that are no longer declared.
fn prune(state: &mut TrackedState, cloud: &mut CloudState, declared: &[ResourceAddress]) {
    for address in state.addresses() {
        if declared.contains(&address) {
            continue;
        }
        if let Some(resource) = state.remove(&address) {
            cloud.delete_object(&resource);
        }
    }
}

/// Builds the authorizer a declaration asks for, with engine defaults applied.
fn desired_authorizer(
    state: &TrackedState,
    decl: &AuthorizerDecl,
    rest_api_id: &str,
    id: &str,
) -> Result<RemoteAuthorizer, EngineError> {
    let resolve_optional = |reference: &Option<Reference>| {
        reference.as_ref().map(|reference| resolve(state, reference)).transpose()
    };
    Ok(RemoteAuthorizer {
        id: id.to_string(),
        rest_api_id: rest_api_id.to_string(),
        name: Some(decl.name.clone()),
        authorizer_type: Some(decl.effective_type()),
        authorizer_uri: resolve_optional(&decl.authorizer_uri)?,
        authorizer_credentials: resolve_optional(&decl.authorizer_credentials)?,
        identity_source: Some(
            decl.identity_source.clone().unwrap_or_else(|| DEFAULT_IDENTITY_SOURCE.to_string()),
        ),
        identity_validation_expression: decl.identity_validation_expression.clone(),
        authorizer_result_ttl_in_seconds: Some(
            decl.authorizer_result_ttl_in_seconds.unwrap_or(DEFAULT_AUTHORIZER_TTL),
        ),
        provider_arns: decl
            .provider_arns
            .iter()
            .map(|reference| resolve(state, reference))
            .collect::<Result<_, _>>()?,
    })
}

/// Resolves a reference against tracked companion attributes.
fn resolve(state: &TrackedState, reference: &Reference) -> Result<String, EngineError> {
    let address = reference.address();
    state
        .get(&address)
        .and_then(|resource| resource.attribute(reference.attribute()))
        .map(str::to_string)
        .ok_or_else(|| {
            EngineError::Rejected(format!(
                "Error: Reference to undeclared resource {}",
                reference.expression()
            ))
        })
}

/// Returns the declared name recorded for a companion.
fn tracked_name(resource: &TrackedResource) -> Option<&str> {
    resource.attribute("name")
}

/// Orders deletes so dependents go before what they depend on.
fn destroy_rank(resource_type: &str) -> u8 {
    match resource_type {
        AUTHORIZER_RESOURCE_TYPE => 0,
        ROLE_POLICY_TYPE => 1,
        FUNCTION_TYPE | USER_POOL_TYPE => 2,
        ROLE_TYPE => 3,
        _ => 4,
    }
}
