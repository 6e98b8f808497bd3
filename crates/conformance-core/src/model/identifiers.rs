// crates/conformance-core/src/model/identifiers.rs
// ============================================================================
// Module: Conformance Identifiers
// Description: Resource addresses and composite remote identifiers.
// Purpose: Provide strongly typed identifiers with stable textual forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Two identifier types cross every boundary in the harness:
//!
//! - [`ResourceAddress`] names a resource inside the engine's tracked state,
//!   e.g. `aws_api_gateway_authorizer.acctest` or
//!   `aws_cognito_user_pool.acctest[1]`.
//! - [`CompositeId`] names a nested remote object by its container and its
//!   own identifier. The textual form `container/object` doubles as the
//!   import identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Resource Address
// ============================================================================

/// Address of a resource within an engine's tracked state.
///
/// # Invariants
/// - The text before the first `.` is the resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAddress(String);

impl ResourceAddress {
    /// Creates a resource address from raw text.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates an address from a resource type, a local name, and an optional index.
    #[must_use]
    pub fn from_parts(resource_type: &str, name: &str, index: Option<usize>) -> Self {
        match index {
            Some(index) => Self(format!("{resource_type}.{name}[{index}]")),
            None => Self(format!("{resource_type}.{name}")),
        }
    }

    /// Returns the address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the resource type segment of the address.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(resource_type, _)| resource_type)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Composite Identifier
// ============================================================================

/// Errors raised when constructing or parsing a [`CompositeId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeIdError {
    /// One of the two components is empty.
    #[error("composite id {part} must be non-empty")]
    Empty {
        /// Name of the empty component.
        part: &'static str,
    },
    /// The text does not have the `container/object` shape.
    #[error("unexpected format of id ({0}), expected container-id/object-id")]
    Malformed(String),
}

/// Identifier of a remote object nested under a container.
///
/// # Invariants
/// - Both components are non-empty and contain no `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId {
    /// Identifier of the enclosing container.
    container_id: String,
    /// Identifier of the object within its container.
    object_id: String,
}

impl CompositeId {
    /// Creates a composite identifier from its components.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeIdError`] when a component is empty or contains `/`.
    pub fn new(
        container_id: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, CompositeIdError> {
        let container_id = container_id.into();
        let object_id = object_id.into();
        if container_id.is_empty() {
            return Err(CompositeIdError::Empty {
                part: "container",
            });
        }
        if object_id.is_empty() {
            return Err(CompositeIdError::Empty {
                part: "object",
            });
        }
        if container_id.contains('/') || object_id.contains('/') {
            return Err(CompositeIdError::Malformed(format!("{container_id}/{object_id}")));
        }
        Ok(Self {
            container_id,
            object_id,
        })
    }

    /// Parses the `container/object` form.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeIdError`] when the text has no separator, more than
    /// one separator, or an empty component.
    pub fn parse(raw: &str) -> Result<Self, CompositeIdError> {
        let (container_id, object_id) =
            raw.split_once('/').ok_or_else(|| CompositeIdError::Malformed(raw.to_string()))?;
        if object_id.contains('/') {
            return Err(CompositeIdError::Malformed(raw.to_string()));
        }
        Self::new(container_id, object_id)
    }

    /// Returns the container identifier.
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Returns the object identifier.
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container_id, self.object_id)
    }
}
