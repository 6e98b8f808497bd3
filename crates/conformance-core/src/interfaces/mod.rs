// crates/conformance-core/src/interfaces/mod.rs
// ============================================================================
// Module: Conformance Interfaces
// Description: Backend-agnostic interfaces for engines and remote services.
// Purpose: Define the contract surfaces driven by the lifecycle verifier.
// Dependencies: crate::model, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces describe the two systems under test without embedding any
//! backend detail:
//!
//! - a [`DeclarativeEngine`] that applies configuration documents, tracks
//!   resulting state, plans, imports, and destroys;
//! - a [`RemoteResourceApi`] that reads and deletes the live object directly,
//!   bypassing the engine.
//!
//! Implementations must not cache remote reads: every fetch reflects the
//! service at the moment of the call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::model::AttributeMap;
use crate::model::CompositeId;
use crate::model::ResourceAddress;
use crate::model::TrackedResource;
use crate::model::TrackedState;

// ============================================================================
// SECTION: Configuration Documents
// ============================================================================

/// Configuration document rendered to text for an engine.
pub trait RenderedConfig {
    /// Returns the rendered document text.
    fn render(&self) -> &str;

    /// Returns a short label for reports and events.
    fn label(&self) -> &str;
}

// ============================================================================
// SECTION: Remote Service
// ============================================================================

/// Service error code that identifies a missing object.
pub const NOT_FOUND_CODE: &str = "NotFoundException";

/// Remote service errors.
///
/// # Invariants
/// - Only [`RemoteError::NotFound`] means the object does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The object does not exist.
    #[error("remote object not found ({code}): {message}")]
    NotFound {
        /// Service error code.
        code: String,
        /// Service error message.
        message: String,
    },
    /// The service answered with any other error.
    #[error("remote api error ({code}): {message}")]
    Api {
        /// Service error code.
        code: String,
        /// Service error message.
        message: String,
    },
    /// The request did not complete or the response could not be read.
    #[error("remote transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Returns true when the error means the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Classifies a service error by its code.
///
/// Only the exact [`NOT_FOUND_CODE`] maps to [`RemoteError::NotFound`]; a
/// missing code is an API error.
#[must_use]
pub fn classify_service_error(code: Option<&str>, message: &str) -> RemoteError {
    match code {
        Some(code) if code == NOT_FOUND_CODE => RemoteError::NotFound {
            code: code.to_string(),
            message: message.to_string(),
        },
        Some(code) => RemoteError::Api {
            code: code.to_string(),
            message: message.to_string(),
        },
        None => RemoteError::Api {
            code: "Unknown".to_string(),
            message: message.to_string(),
        },
    }
}

/// Live object returned by a remote read.
pub trait RemoteObject {
    /// Returns the object's attributes flattened like tracked state.
    ///
    /// Unset optional fields are missing from the map.
    fn attributes(&self) -> AttributeMap;

    /// Returns one attribute value.
    fn attribute(&self, field: &str) -> Option<String> {
        self.attributes().remove(field)
    }
}

/// Direct access to the remote service for one resource type.
pub trait RemoteResourceApi {
    /// Live object shape.
    type Object: RemoteObject;

    /// Resource type label tracked by the engine, e.g. `aws_api_gateway_authorizer`.
    fn resource_type(&self) -> &str;

    /// Tracked attribute holding the container identifier.
    fn container_attribute(&self) -> &str;

    /// Reads the live object.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] when the object does not exist and
    /// another [`RemoteError`] on any other failure.
    fn fetch(&self, id: &CompositeId) -> Result<Self::Object, RemoteError>;

    /// Deletes the live object out-of-band.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the delete call fails.
    fn delete(&self, id: &CompositeId) -> Result<(), RemoteError>;
}

// ============================================================================
// SECTION: Declarative Engine
// ============================================================================

/// Declarative engine errors.
///
/// # Invariants
/// - [`EngineError::Rejected`] carries the engine's own diagnostic text so
///   expected-error steps can match against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine rejected the document or the service rejected a change.
    #[error("{0}")]
    Rejected(String),
    /// Engine process or filesystem failure.
    #[error("engine io error: {0}")]
    Io(String),
    /// Engine output could not be interpreted.
    #[error("engine output invalid: {0}")]
    Output(String),
}

impl EngineError {
    /// Returns the diagnostic text.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Planned action for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Resource will be created.
    Create,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed and recreated.
    Replace,
    /// Resource will be destroyed.
    Delete,
}

impl PlanAction {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }

    /// Returns true when the action creates a new remote object.
    #[must_use]
    pub const fn creates(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

/// One planned change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChange {
    /// Address of the affected resource.
    pub address: ResourceAddress,
    /// Planned action.
    pub action: PlanAction,
}

/// Summary of changes an engine would make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Planned changes; no-op resources are omitted.
    pub changes: Vec<PlannedChange>,
}

impl PlanSummary {
    /// Returns true when no change is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the planned action for an address.
    #[must_use]
    pub fn action_for(&self, address: &ResourceAddress) -> Option<PlanAction> {
        self.changes.iter().find(|change| &change.address == address).map(|change| change.action)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            return f.write_str("no changes");
        }
        for (index, change) in self.changes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", change.action.as_str(), change.address)?;
        }
        Ok(())
    }
}

/// Declarative infrastructure engine.
///
/// # Invariants
/// - [`DeclarativeEngine::state`] reflects the last completed operation,
///   including resources left behind by a partially failed apply.
pub trait DeclarativeEngine {
    /// Configuration document type.
    type Document;

    /// Brings the deployment to the document's declared state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Rejected`] with the engine's diagnostic when
    /// validation or the remote service rejects the document.
    fn apply(&mut self, document: &Self::Document) -> Result<(), EngineError>;

    /// Computes the changes needed to reach the document's declared state,
    /// refreshing from the remote service first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when planning fails.
    fn plan(&mut self, document: &Self::Document) -> Result<PlanSummary, EngineError>;

    /// Imports the live object `import_id` as `address` into a fresh state
    /// and returns what the import recorded. The engine's own state is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the object cannot be imported.
    fn import(
        &mut self,
        document: &Self::Document,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<TrackedResource, EngineError>;

    /// Destroys every tracked resource.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when teardown fails.
    fn destroy(&mut self) -> Result<(), EngineError>;

    /// Returns the current tracked state.
    fn state(&self) -> &TrackedState;
}
