// crates/conformance-core/src/runtime/verifier.rs
// ============================================================================
// Module: Lifecycle Verifier
// Description: Executes test cases against an engine and a remote service.
// Purpose: Apply, check, import, tear down, and confirm destruction.
// Dependencies: crate::interfaces, crate::model, serde
// ============================================================================

//! ## Overview
//! [`LifecycleVerifier`] runs one [`TestCase`] at a time:
//!
//! 1. Steps run in order; the first failing step stops the case and the
//!    remaining steps are recorded as skipped.
//! 2. Teardown always runs. Tracked state is snapshotted first, the engine
//!    destroys everything, and every snapshotted resource of the remote type
//!    is looked up again and must be gone.
//! 3. The first step failure decides the case; teardown problems are then
//!    kept as cleanup notes. Without a step failure, the first teardown
//!    problem decides the case.
//!
//! # Invariants
//! - Remote reads are never cached; every check calls the service.
//! - Only a not-found error counts as "destroyed".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::DeclarativeEngine;
use crate::interfaces::RemoteObject;
use crate::interfaces::RemoteResourceApi;
use crate::model::AttrPattern;
use crate::model::AttributeSource;
use crate::model::CaseReport;
use crate::model::CaseStatus;
use crate::model::CompositeId;
use crate::model::Expected;
use crate::model::FailureRecord;
use crate::model::HarnessError;
use crate::model::ResourceAddress;
use crate::model::StepRecord;
use crate::model::StepStatus;
use crate::model::TrackedResource;
use crate::model::TrackedState;
use crate::model::describe_actual;
use crate::runtime::checks::Check;
use crate::runtime::events::HarnessEvent;
use crate::runtime::events::HarnessEventKind;
use crate::runtime::events::HarnessEventSink;
use crate::runtime::step::LifecycleStep;
use crate::runtime::step::PlanExpectation;
use crate::runtime::step::TestCase;

// ============================================================================
// SECTION: Options
// ============================================================================

/// How the post-destroy check walks the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestroyCheckMode {
    /// Every snapshotted resource of the remote type must be gone.
    #[default]
    Exhaustive,
    /// Stops after the first resource of the remote type that is gone.
    /// Later resources are not checked.
    FirstMatch,
}

/// Verifier behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifierOptions {
    /// Destroy check mode.
    pub destroy_check: DestroyCheckMode,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Systems under test plus the event sink.
pub struct VerifierContext<E, R> {
    /// Declarative engine.
    engine: E,
    /// Direct remote access.
    remote: R,
    /// Event sink.
    events: Arc<dyn HarnessEventSink>,
    /// Behavior switches.
    options: VerifierOptions,
}

impl<E, R> VerifierContext<E, R> {
    /// Creates a context with default options.
    #[must_use]
    pub fn new(engine: E, remote: R, events: Arc<dyn HarnessEventSink>) -> Self {
        Self {
            engine,
            remote,
            events,
            options: VerifierOptions::default(),
        }
    }

    /// Overrides the verifier options.
    #[must_use]
    pub const fn with_options(mut self, options: VerifierOptions) -> Self {
        self.options = options;
        self
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Runs test cases against one engine and one remote service.
pub struct LifecycleVerifier<E, R> {
    /// Systems under test.
    ctx: VerifierContext<E, R>,
    /// Name of the running case, used to label events.
    case: String,
    /// First id observed per address in the running case.
    observed_ids: BTreeMap<ResourceAddress, String>,
}

impl<E, R> LifecycleVerifier<E, R>
where
    E: DeclarativeEngine,
    R: RemoteResourceApi,
{
    /// Creates a verifier.
    #[must_use]
    pub fn new(ctx: VerifierContext<E, R>) -> Self {
        Self {
            ctx,
            case: String::new(),
            observed_ids: BTreeMap::new(),
        }
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.ctx.engine
    }

    /// Returns the remote service.
    #[must_use]
    pub const fn remote(&self) -> &R {
        &self.ctx.remote
    }

    /// Runs one case end to end and reports its outcome.
    pub fn run_case(&mut self, case: &TestCase<E::Document>) -> CaseReport {
        let started = Instant::now();
        self.case.clone_from(&case.name);
        self.observed_ids.clear();
        self.emit(HarnessEventKind::CaseStarted, None, Some(format!("{} steps", case.steps.len())));

        let mut steps = Vec::with_capacity(case.steps.len());
        let mut failure: Option<FailureRecord> = None;
        let mut last_applied: Option<&E::Document> = None;
        for (index, step) in case.steps.iter().enumerate() {
            if failure.is_some() {
                steps.push(StepRecord {
                    index,
                    kind: step.kind_label(),
                    status: StepStatus::Skipped,
                    detail: None,
                });
                continue;
            }
            self.emit(HarnessEventKind::StepStarted, Some(index), Some(step.kind_label().into()));
            match self.run_step(index, step, last_applied) {
                Ok(()) => {
                    if let LifecycleStep::Apply {
                        config, ..
                    } = step
                    {
                        last_applied = Some(config);
                    }
                    self.emit(HarnessEventKind::StepPassed, Some(index), None);
                    steps.push(StepRecord {
                        index,
                        kind: step.kind_label(),
                        status: StepStatus::Passed,
                        detail: None,
                    });
                }
                Err(err) => {
                    self.emit(HarnessEventKind::StepFailed, Some(index), Some(err.to_string()));
                    steps.push(StepRecord {
                        index,
                        kind: step.kind_label(),
                        status: StepStatus::Failed,
                        detail: Some(err.to_string()),
                    });
                    failure = Some(FailureRecord::from_error(Some(index), &err));
                }
            }
        }

        let mut cleanup_notes = Vec::new();
        for err in self.teardown() {
            self.emit(HarnessEventKind::CleanupFailed, None, Some(err.to_string()));
            if failure.is_none() {
                failure = Some(FailureRecord::from_error(None, &err));
            } else {
                cleanup_notes.push(err.to_string());
            }
        }

        let status = if failure.is_some() { CaseStatus::Failed } else { CaseStatus::Passed };
        let label = match status {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
        };
        self.emit(HarnessEventKind::CaseFinished, None, Some(label.to_string()));
        CaseReport {
            case: case.name.clone(),
            status,
            failure,
            steps,
            cleanup_notes,
            duration_ms: started.elapsed().as_millis(),
        }
    }

    /// Dispatches one step.
    fn run_step(
        &mut self,
        index: usize,
        step: &LifecycleStep<E::Document>,
        last_applied: Option<&E::Document>,
    ) -> Result<(), HarnessError> {
        match step {
            LifecycleStep::Apply {
                config,
                checks,
                plan,
            } => self.apply_and_check(config, checks, *plan),
            LifecycleStep::ExpectError {
                config,
                pattern,
            } => self.expect_error(index, config, pattern),
            LifecycleStep::Import {
                address,
                verify,
                ignore,
            } => {
                let config = last_applied.ok_or_else(|| {
                    HarnessError::InvalidCase(
                        "import step requires a previously applied configuration".to_string(),
                    )
                })?;
                self.import_round_trip(index, config, address, *verify, ignore)
            }
        }
    }

    /// Applies `config`, runs `checks`, then plans and compares against `plan`.
    ///
    /// Addresses deleted by [`Check::Disappears`] must be scheduled for
    /// creation by the follow-up plan.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] for the first failing apply, check, or plan.
    pub fn apply_and_check(
        &mut self,
        config: &E::Document,
        checks: &[Check],
        plan: PlanExpectation,
    ) -> Result<(), HarnessError> {
        self.ctx.engine.apply(config)?;
        let mut disappeared = Vec::new();
        for check in checks {
            self.run_check(check)?;
            if let Check::Disappears {
                address,
            } = check
            {
                disappeared.push(address);
            }
        }
        let summary = self.ctx.engine.plan(config)?;
        let converged = summary.is_empty();
        let expected_met = match plan {
            PlanExpectation::Empty => converged,
            PlanExpectation::NonEmpty => !converged,
        };
        if !expected_met {
            return Err(HarnessError::UnexpectedPlan {
                expected: plan.as_str().to_string(),
                planned: summary.to_string(),
            });
        }
        for address in disappeared {
            if !summary.action_for(address).is_some_and(|action| action.creates()) {
                return Err(HarnessError::UnexpectedPlan {
                    expected: format!("a plan recreating {address} in"),
                    planned: summary.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Evaluates one check.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the check fails.
    pub fn run_check(&mut self, check: &Check) -> Result<(), HarnessError> {
        match check {
            Check::Exists {
                address,
            } => self.check_exists(address).map(|_| ()),
            Check::TrackedAttr {
                address,
                field,
                expected,
            } => {
                let resource = self.tracked(address)?;
                assert_attr(address, AttributeSource::Tracked, field, expected, resource.attribute(field))
            }
            Check::RemoteAttr {
                address,
                field,
                expected,
            } => {
                let object = self.check_exists(address)?;
                let actual = object.attribute(field);
                assert_attr(address, AttributeSource::Remote, field, expected, actual.as_deref())
            }
            Check::StableId {
                address,
            } => self.check_stable_id(address),
            Check::Disappears {
                address,
            } => self.check_disappears(address),
        }
    }

    /// Reads the live object behind a tracked address.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the address is untracked, has no id, or
    /// the remote read fails.
    pub fn check_exists(&self, address: &ResourceAddress) -> Result<R::Object, HarnessError> {
        let id = composite_id_for(self.tracked(address)?, self.ctx.remote.container_attribute())?;
        self.ctx.remote.fetch(&id).map_err(|source| HarnessError::Remote {
            address: address.to_string(),
            source,
        })
    }

    /// Compares the tracked id with the first id seen in this case.
    fn check_stable_id(&mut self, address: &ResourceAddress) -> Result<(), HarnessError> {
        let current = self.tracked(address)?.id.clone();
        match self.observed_ids.get(address) {
            Some(first) if first != &current => Err(HarnessError::Assertion {
                address: address.to_string(),
                source_kind: AttributeSource::Tracked,
                field: "id".to_string(),
                expected: format!("\"{first}\""),
                actual: format!("\"{current}\""),
            }),
            Some(_) => Ok(()),
            None => {
                self.observed_ids.insert(address.clone(), current);
                Ok(())
            }
        }
    }

    /// Deletes the live object behind `address` without touching tracked state.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the address is untracked or the delete fails.
    pub fn check_disappears(&self, address: &ResourceAddress) -> Result<(), HarnessError> {
        let id = composite_id_for(self.tracked(address)?, self.ctx.remote.container_attribute())?;
        self.ctx.remote.delete(&id).map_err(|source| HarnessError::Remote {
            address: address.to_string(),
            source,
        })?;
        self.emit(HarnessEventKind::RemoteDeleted, None, Some(id.to_string()));
        Ok(())
    }

    /// Applies `config` and requires an error whose text matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ExpectedErrorMissing`] when the apply succeeds
    /// and [`HarnessError::ExpectedErrorMismatch`] when the error differs.
    pub fn expect_error(
        &mut self,
        index: usize,
        config: &E::Document,
        pattern: &AttrPattern,
    ) -> Result<(), HarnessError> {
        match self.ctx.engine.apply(config) {
            Ok(()) => Err(HarnessError::ExpectedErrorMissing {
                pattern: pattern.as_str().to_string(),
            }),
            Err(err) => {
                let actual = err.message();
                if pattern.is_match(&actual) {
                    self.emit(HarnessEventKind::ExpectedErrorMatched, Some(index), Some(actual));
                    Ok(())
                } else {
                    Err(HarnessError::ExpectedErrorMismatch {
                        pattern: pattern.as_str().to_string(),
                        actual,
                    })
                }
            }
        }
    }

    /// Imports the live object behind `address` and compares it with the
    /// applied state.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the import fails or the states differ.
    pub fn import_round_trip(
        &mut self,
        index: usize,
        config: &E::Document,
        address: &ResourceAddress,
        verify: bool,
        ignore: &[String],
    ) -> Result<(), HarnessError> {
        let applied = self.tracked(address)?.clone();
        let import_id = composite_id_for(&applied, self.ctx.remote.container_attribute())?;
        let imported = self.ctx.engine.import(config, address, &import_id.to_string())?;
        if verify {
            verify_import(&applied, &imported, ignore)?;
        }
        self.emit(HarnessEventKind::ImportVerified, Some(index), Some(import_id.to_string()));
        Ok(())
    }

    /// Confirms that no snapshotted resource of the remote type survives.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::StillExists`] for a surviving object and
    /// [`HarnessError::Remote`] for any lookup error other than not-found.
    pub fn check_destroyed(&self, snapshot: &TrackedState) -> Result<(), HarnessError> {
        let container = self.ctx.remote.container_attribute();
        for resource in snapshot.resources_of_type(self.ctx.remote.resource_type()) {
            let id = composite_id_for(resource, container)?;
            match self.ctx.remote.fetch(&id) {
                Ok(_) => {
                    return Err(HarnessError::StillExists {
                        address: resource.address.to_string(),
                        id: id.to_string(),
                    });
                }
                Err(err) if err.is_not_found() => {
                    if self.ctx.options.destroy_check == DestroyCheckMode::FirstMatch {
                        return Ok(());
                    }
                }
                Err(source) => {
                    return Err(HarnessError::Remote {
                        address: resource.address.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Destroys the deployment and runs the destroy check against a
    /// pre-destroy snapshot. Returns every problem found.
    fn teardown(&mut self) -> Vec<HarnessError> {
        let snapshot = self.ctx.engine.state().clone();
        let mut problems = Vec::new();
        if let Err(err) = self.ctx.engine.destroy() {
            problems.push(HarnessError::Engine(err));
        }
        match self.check_destroyed(&snapshot) {
            Ok(()) => {
                let detail = format!("{} tracked resources checked", snapshot.len());
                self.emit(HarnessEventKind::DestroyChecked, None, Some(detail));
            }
            Err(err) => problems.push(err),
        }
        problems
    }

    /// Looks up a tracked resource.
    fn tracked(&self, address: &ResourceAddress) -> Result<&TrackedResource, HarnessError> {
        self.ctx.engine.state().get(address).ok_or_else(|| {
            HarnessError::StateInconsistency(format!("{address} not found in tracked state"))
        })
    }

    /// Records an event for the running case.
    fn emit(&self, kind: HarnessEventKind, step: Option<usize>, detail: Option<String>) {
        self.ctx.events.record(&HarnessEvent::new(kind, &self.case, step, detail));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the composite id of a tracked resource from its id and container attribute.
///
/// # Errors
///
/// Returns [`HarnessError::StateInconsistency`] when the id or the container
/// attribute is missing or empty.
pub fn composite_id_for(
    resource: &TrackedResource,
    container_attribute: &str,
) -> Result<CompositeId, HarnessError> {
    if !resource.has_id() {
        return Err(HarnessError::StateInconsistency(format!(
            "no id is set for {}",
            resource.address
        )));
    }
    let container = resource.attribute(container_attribute).filter(|value| !value.is_empty());
    let container = container.ok_or_else(|| {
        HarnessError::StateInconsistency(format!(
            "{} has no {container_attribute}",
            resource.address
        ))
    })?;
    CompositeId::new(container, resource.id.as_str())
        .map_err(|err| HarnessError::StateInconsistency(format!("{}: {err}", resource.address)))
}

/// Compares one attribute against its expectation.
fn assert_attr(
    address: &ResourceAddress,
    source_kind: AttributeSource,
    field: &str,
    expected: &Expected,
    actual: Option<&str>,
) -> Result<(), HarnessError> {
    if expected.matches(actual) {
        return Ok(());
    }
    Err(HarnessError::Assertion {
        address: address.to_string(),
        source_kind,
        field: field.to_string(),
        expected: expected.to_string(),
        actual: describe_actual(actual),
    })
}

/// Returns true when `key` is `ignored` or one of its flattened children.
fn is_ignored(key: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|ignored| {
        key == ignored
            || key.strip_prefix(ignored.as_str()).is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Compares imported state with applied state, skipping ignored attributes.
///
/// # Errors
///
/// Returns [`HarnessError::ImportMismatch`] for the first differing attribute
/// in name order, with the primary id checked first.
pub fn verify_import(
    applied: &TrackedResource,
    imported: &TrackedResource,
    ignore: &[String],
) -> Result<(), HarnessError> {
    if applied.id != imported.id {
        return Err(HarnessError::ImportMismatch {
            address: applied.address.to_string(),
            field: "id".to_string(),
            applied: describe_actual(Some(applied.id.as_str())),
            imported: describe_actual(Some(imported.id.as_str())),
        });
    }
    let keys: BTreeSet<&String> =
        applied.attributes.keys().chain(imported.attributes.keys()).collect();
    for key in keys {
        if is_ignored(key, ignore) {
            continue;
        }
        let left = applied.attribute(key);
        let right = imported.attribute(key);
        if left != right {
            return Err(HarnessError::ImportMismatch {
                address: applied.address.to_string(),
                field: key.clone(),
                applied: describe_actual(left),
                imported: describe_actual(right),
            });
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
