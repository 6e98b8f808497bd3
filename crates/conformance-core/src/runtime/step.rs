// crates/conformance-core/src/runtime/step.rs
// ============================================================================
// Module: Lifecycle Steps
// Description: Test case and step definitions.
// Purpose: Describe an ordered lifecycle of apply, expect-error, and import.
// Dependencies: crate::model, crate::runtime::checks
// ============================================================================

//! ## Overview
//! A [`TestCase`] owns its configuration documents. Import steps carry no
//! document: they reuse the most recently applied one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::AttrPattern;
use crate::model::ResourceAddress;
use crate::runtime::checks::Check;

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Expected shape of the plan computed right after an apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanExpectation {
    /// The configuration must have converged.
    Empty,
    /// Drift was introduced and the plan must show changes.
    NonEmpty,
}

impl PlanExpectation {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "an empty",
            Self::NonEmpty => "a non-empty",
        }
    }
}

/// One lifecycle step.
#[derive(Debug, Clone)]
pub enum LifecycleStep<D> {
    /// Apply `config`, run `checks`, then plan against `plan`.
    Apply {
        /// Configuration document.
        config: D,
        /// Checks run after the apply.
        checks: Vec<Check>,
        /// Expected post-apply plan.
        plan: PlanExpectation,
    },
    /// Apply `config` and require an error matching `pattern`.
    ExpectError {
        /// Configuration document.
        config: D,
        /// Pattern the error text must match.
        pattern: AttrPattern,
    },
    /// Import the object behind `address` and compare with applied state.
    Import {
        /// Resource address.
        address: ResourceAddress,
        /// Whether imported state is compared with applied state.
        verify: bool,
        /// Attribute names excluded from the comparison.
        ignore: Vec<String>,
    },
}

impl<D> LifecycleStep<D> {
    /// Applies `config` and expects it to converge.
    #[must_use]
    pub const fn apply(config: D, checks: Vec<Check>) -> Self {
        Self::Apply {
            config,
            checks,
            plan: PlanExpectation::Empty,
        }
    }

    /// Applies `config` and expects the follow-up plan to show drift.
    #[must_use]
    pub const fn apply_expecting_drift(config: D, checks: Vec<Check>) -> Self {
        Self::Apply {
            config,
            checks,
            plan: PlanExpectation::NonEmpty,
        }
    }

    /// Applies `config` and expects a matching error.
    #[must_use]
    pub const fn expect_error(config: D, pattern: AttrPattern) -> Self {
        Self::ExpectError {
            config,
            pattern,
        }
    }

    /// Imports and verifies the object behind `address`.
    #[must_use]
    pub const fn import(address: ResourceAddress) -> Self {
        Self::Import {
            address,
            verify: true,
            ignore: Vec::new(),
        }
    }

    /// Imports and verifies, skipping the named attributes.
    #[must_use]
    pub const fn import_ignoring(address: ResourceAddress, ignore: Vec<String>) -> Self {
        Self::Import {
            address,
            verify: true,
            ignore,
        }
    }

    /// Returns the step kind label.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Apply {
                ..
            } => "apply",
            Self::ExpectError {
                ..
            } => "expect_error",
            Self::Import {
                ..
            } => "import",
        }
    }
}

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// Named, ordered list of lifecycle steps.
#[derive(Debug, Clone)]
pub struct TestCase<D> {
    /// Case name.
    pub name: String,
    /// Steps in execution order.
    pub steps: Vec<LifecycleStep<D>>,
}

impl<D> TestCase<D> {
    /// Creates an empty case.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: LifecycleStep<D>) -> Self {
        self.steps.push(step);
        self
    }
}
