// crates/apigw-authorizer/src/sim/remote.rs
// ============================================================================
// Module: Simulated API Gateway Client
// Description: Direct authorizer reads and deletes against the simulated cloud.
// Purpose: Stand in for the live service client in remote checks.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! Mirrors the live client's error contract: a missing authorizer is a
//! not-found service error carrying [`NOT_FOUND_CODE`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::CompositeId;
use conformance_core::NOT_FOUND_CODE;
use conformance_core::RemoteError;
use conformance_core::RemoteResourceApi;

use super::SimulatedCloud;
use crate::model::AUTHORIZER_RESOURCE_TYPE;
use crate::model::CONTAINER_ATTRIBUTE;
use crate::model::RemoteAuthorizer;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Service client backed by a [`SimulatedCloud`].
#[derive(Debug, Clone)]
pub struct SimulatedApiGateway {
    /// Shared cloud.
    cloud: SimulatedCloud,
}

impl SimulatedApiGateway {
    /// Creates a client over `cloud`.
    #[must_use]
    pub const fn new(cloud: SimulatedCloud) -> Self {
        Self {
            cloud,
        }
    }
}

/// Builds the service's not-found error.
fn not_found() -> RemoteError {
    RemoteError::NotFound {
        code: NOT_FOUND_CODE.to_string(),
        message: "Invalid Authorizer identifier specified".to_string(),
    }
}

impl RemoteResourceApi for SimulatedApiGateway {
    type Object = RemoteAuthorizer;

    fn resource_type(&self) -> &str {
        AUTHORIZER_RESOURCE_TYPE
    }

    fn container_attribute(&self) -> &str {
        CONTAINER_ATTRIBUTE
    }

    fn fetch(&self, id: &CompositeId) -> Result<RemoteAuthorizer, RemoteError> {
        let mut cloud = self.cloud.lock();
        if cloud.faults().read_error_after_destroy && cloud.is_destroyed(id.container_id()) {
            return Err(RemoteError::Transport("connection reset by peer".to_string()));
        }
        cloud.read_authorizer(id.container_id(), id.object_id()).ok_or_else(not_found)
    }

    fn delete(&self, id: &CompositeId) -> Result<(), RemoteError> {
        let mut cloud = self.cloud.lock();
        if cloud.remove_authorizer(id.container_id(), id.object_id()) {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}
