// crates/conformance-core/src/model/report.rs
// ============================================================================
// Module: Conformance Reports
// Description: Serializable per-case and per-suite outcomes.
// Purpose: Record what ran, what failed, and what cleanup reported.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CaseReport`] is produced for every case, including cases that could
//! not be set up. Step failures stop the case; teardown still runs and its
//! problems are kept as cleanup notes so the first failure is never masked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::model::error::HarnessError;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Final status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every step and the destroy check passed.
    Passed,
    /// A step, teardown, or the destroy check failed.
    Failed,
}

/// Status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step passed.
    Passed,
    /// The step failed.
    Failed,
    /// The step did not run because an earlier step failed.
    Skipped,
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Zero-based step index.
    pub index: usize,
    /// Step kind label.
    pub kind: &'static str,
    /// Step status.
    pub status: StepStatus,
    /// Failure detail for failed steps.
    pub detail: Option<String>,
}

/// Description of the failure that decided a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Failing step index; `None` for setup or teardown failures.
    pub step: Option<usize>,
    /// Stable failure kind label.
    pub kind: &'static str,
    /// Rendered failure message.
    pub message: String,
}

impl FailureRecord {
    /// Builds a record from a harness error.
    #[must_use]
    pub fn from_error(step: Option<usize>, error: &HarnessError) -> Self {
        Self {
            step,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub case: String,
    /// Final status.
    pub status: CaseStatus,
    /// Failure that decided the case.
    pub failure: Option<FailureRecord>,
    /// Per-step outcomes.
    pub steps: Vec<StepRecord>,
    /// Teardown problems that did not decide the case.
    pub cleanup_notes: Vec<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
}

impl CaseReport {
    /// Builds the report for a case whose verifier could not be created.
    #[must_use]
    pub fn setup_failed(case: &str, error: &HarnessError) -> Self {
        Self {
            case: case.to_string(),
            status: CaseStatus::Failed,
            failure: Some(FailureRecord::from_error(None, error)),
            steps: Vec::new(),
            cleanup_notes: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Returns true when the case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Outcome of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Case reports in case order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Returns the number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    /// Returns the number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// Returns true when every case passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    /// Returns a case report by name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.case == name)
    }
}
