// crates/conformance-core/src/runtime/suite.rs
// ============================================================================
// Module: Suite Runner
// Description: Runs independent cases concurrently with bounded parallelism.
// Purpose: Give each case its own verifier and collect ordered reports.
// Dependencies: crate::runtime::verifier
// ============================================================================

//! ## Overview
//! Cases share nothing: each one gets a verifier built by the caller's
//! factory, so engines and remote clients never cross cases. Workers pull
//! the next case index from a shared counter and reports are returned in
//! case order regardless of completion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use crate::interfaces::DeclarativeEngine;
use crate::interfaces::RemoteResourceApi;
use crate::model::CaseReport;
use crate::model::HarnessError;
use crate::model::SuiteReport;
use crate::runtime::step::TestCase;
use crate::runtime::verifier::LifecycleVerifier;

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Concurrent suite runner.
#[derive(Debug, Clone, Copy)]
pub struct SuiteRunner {
    /// Maximum number of cases in flight.
    parallelism: NonZeroUsize,
}

impl SuiteRunner {
    /// Creates a runner; zero parallelism is treated as one.
    #[must_use]
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: NonZeroUsize::new(parallelism).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Returns the configured parallelism.
    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism.get()
    }

    /// Runs every case, building one verifier per case with `factory`.
    ///
    /// A factory error fails that case without running it.
    pub fn run<D, E, R, F>(&self, cases: &[TestCase<D>], factory: F) -> SuiteReport
    where
        D: Sync,
        E: DeclarativeEngine<Document = D>,
        R: RemoteResourceApi,
        F: Fn(&TestCase<D>) -> Result<LifecycleVerifier<E, R>, HarnessError> + Sync,
    {
        let next = AtomicUsize::new(0);
        let results: Mutex<Vec<(usize, CaseReport)>> = Mutex::new(Vec::with_capacity(cases.len()));
        let workers = self.parallelism.get().min(cases.len().max(1));
        thread::scope(|scope| {
            for _ in 0 .. workers {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(case) = cases.get(index) else {
                            break;
                        };
                        let report = match factory(case) {
                            Ok(mut verifier) => verifier.run_case(case),
                            Err(err) => CaseReport::setup_failed(&case.name, &err),
                        };
                        results.lock().unwrap_or_else(PoisonError::into_inner).push((index, report));
                    }
                });
            }
        });
        let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_by_key(|(index, _)| *index);
        SuiteReport {
            cases: results.into_iter().map(|(_, report)| report).collect(),
        }
    }
}
