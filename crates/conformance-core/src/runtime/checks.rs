// crates/conformance-core/src/runtime/checks.rs
// ============================================================================
// Module: Checks
// Description: Declarative assertions run after an apply step.
// Purpose: Describe existence, attribute, identity, and disappearance checks.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! A [`Check`] names what to assert, not how. The verifier evaluates checks
//! in order and stops at the first failure. Remote checks always read the
//! live object again; nothing is cached between checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::Expected;
use crate::model::ExpectedAttributes;
use crate::model::ResourceAddress;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Assertion evaluated after an apply step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The remote object behind `address` exists.
    Exists {
        /// Resource address.
        address: ResourceAddress,
    },
    /// A tracked attribute satisfies `expected`.
    TrackedAttr {
        /// Resource address.
        address: ResourceAddress,
        /// Flattened attribute name.
        field: String,
        /// Expected value.
        expected: Expected,
    },
    /// An attribute of the live remote object satisfies `expected`.
    RemoteAttr {
        /// Resource address.
        address: ResourceAddress,
        /// Remote attribute name.
        field: String,
        /// Expected value.
        expected: Expected,
    },
    /// The tracked id equals the id first observed for `address` in this case.
    StableId {
        /// Resource address.
        address: ResourceAddress,
    },
    /// Deletes the remote object out-of-band; the following plan must
    /// schedule its recreation.
    Disappears {
        /// Resource address.
        address: ResourceAddress,
    },
}

impl Check {
    /// Checks that the remote object exists.
    #[must_use]
    pub const fn exists(address: ResourceAddress) -> Self {
        Self::Exists {
            address,
        }
    }

    /// Checks a tracked attribute.
    #[must_use]
    pub fn tracked(address: ResourceAddress, field: impl Into<String>, expected: Expected) -> Self {
        Self::TrackedAttr {
            address,
            field: field.into(),
            expected,
        }
    }

    /// Checks a remote attribute.
    #[must_use]
    pub fn remote(address: ResourceAddress, field: impl Into<String>, expected: Expected) -> Self {
        Self::RemoteAttr {
            address,
            field: field.into(),
            expected,
        }
    }

    /// Checks that updates keep the object's identity.
    #[must_use]
    pub const fn stable_id(address: ResourceAddress) -> Self {
        Self::StableId {
            address,
        }
    }

    /// Deletes the remote object out-of-band.
    #[must_use]
    pub const fn disappears(address: ResourceAddress) -> Self {
        Self::Disappears {
            address,
        }
    }

    /// Expands expectations into tracked-state checks.
    #[must_use]
    pub fn tracked_all(address: &ResourceAddress, expected: &ExpectedAttributes) -> Vec<Self> {
        expected
            .iter()
            .map(|(field, expected)| Self::tracked(address.clone(), field, expected.clone()))
            .collect()
    }

    /// Expands expectations into remote checks.
    #[must_use]
    pub fn remote_all(address: &ResourceAddress, expected: &ExpectedAttributes) -> Vec<Self> {
        expected
            .iter()
            .map(|(field, expected)| Self::remote(address.clone(), field, expected.clone()))
            .collect()
    }

    /// Returns the checked resource address.
    #[must_use]
    pub const fn address(&self) -> &ResourceAddress {
        match self {
            Self::Exists {
                address,
            }
            | Self::TrackedAttr {
                address, ..
            }
            | Self::RemoteAttr {
                address, ..
            }
            | Self::StableId {
                address,
            }
            | Self::Disappears {
                address,
            } => address,
        }
    }
}
