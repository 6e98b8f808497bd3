// crates/conformance-core/src/model/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Failure taxonomy for lifecycle verification.
// Purpose: Name the exact reason a case failed with enough context to act on.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failed step or teardown maps to one [`HarnessError`] variant. Each
//! variant carries the resource address and the values involved, and
//! [`HarnessError::kind`] exposes a stable label for reports and events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::interfaces::EngineError;
use crate::interfaces::RemoteError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Where an asserted attribute was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSource {
    /// Engine tracked state.
    Tracked,
    /// Live remote object.
    Remote,
}

impl fmt::Display for AttributeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracked => f.write_str("tracked"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Lifecycle verification failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling; see [`HarnessError::kind`].
#[derive(Debug, Error)]
pub enum HarnessError {
    /// An attribute did not satisfy its expectation.
    #[error("{source_kind} attribute {field} of {address} mismatched: expected {expected}, got {actual}")]
    Assertion {
        /// Resource address.
        address: String,
        /// Where the attribute was read from.
        source_kind: AttributeSource,
        /// Attribute name.
        field: String,
        /// Rendered expectation.
        expected: String,
        /// Rendered observed value.
        actual: String,
    },
    /// An expected-error step failed with a non-matching error.
    #[error("expected an error matching /{pattern}/, got: {actual}")]
    ExpectedErrorMismatch {
        /// Expected error pattern.
        pattern: String,
        /// Actual error text.
        actual: String,
    },
    /// An expected-error step applied cleanly.
    #[error("expected an error matching /{pattern}/, but the configuration applied cleanly")]
    ExpectedErrorMissing {
        /// Expected error pattern.
        pattern: String,
    },
    /// A direct remote call failed.
    #[error("remote call for {address} failed: {source}")]
    Remote {
        /// Resource address.
        address: String,
        /// Underlying remote error.
        source: RemoteError,
    },
    /// An engine operation failed outside an expected-error step.
    #[error("engine operation failed: {0}")]
    Engine(#[from] EngineError),
    /// Tracked state is missing data the verifier needs.
    #[error("tracked state inconsistent: {0}")]
    StateInconsistency(String),
    /// Imported state differs from applied state.
    #[error("import of {address} differs on {field}: applied {applied}, imported {imported}")]
    ImportMismatch {
        /// Resource address.
        address: String,
        /// Attribute name.
        field: String,
        /// Rendered applied value.
        applied: String,
        /// Rendered imported value.
        imported: String,
    },
    /// A resource survived teardown.
    #[error("{address} ({id}) still exists after destroy")]
    StillExists {
        /// Resource address.
        address: String,
        /// Composite identifier of the surviving object.
        id: String,
    },
    /// The post-apply plan did not meet its expectation.
    #[error("expected {expected} plan after apply, planned: {planned}")]
    UnexpectedPlan {
        /// Expected plan shape.
        expected: String,
        /// Rendered planned changes.
        planned: String,
    },
    /// The case itself is malformed.
    #[error("invalid test case: {0}")]
    InvalidCase(String),
}

impl HarnessError {
    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Assertion { .. } => "assertion",
            Self::ExpectedErrorMismatch { .. } | Self::ExpectedErrorMissing { .. } => {
                "expected_error"
            }
            Self::Remote { .. } => "remote",
            Self::Engine(_) => "engine",
            Self::StateInconsistency(_) => "state_inconsistency",
            Self::ImportMismatch { .. } => "import_mismatch",
            Self::StillExists { .. } => "still_exists",
            Self::UnexpectedPlan { .. } => "unexpected_plan",
            Self::InvalidCase(_) => "invalid_case",
        }
    }
}
