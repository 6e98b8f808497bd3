// crates/conformance-core/src/runtime/verifier/tests.rs
// ============================================================================
// Module: Lifecycle Verifier Tests
// Description: Unit tests for step execution, teardown, and destroy checks.
// Purpose: Validate verifier semantics against an in-memory engine.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! Uses a small in-memory engine and remote store to exercise step ordering,
//! teardown guarantees, drift detection, import comparison, and both
//! destroy-check modes.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use super::DestroyCheckMode;
use super::LifecycleVerifier;
use super::VerifierContext;
use super::VerifierOptions;
use super::composite_id_for;
use super::verify_import;
use crate::interfaces::DeclarativeEngine;
use crate::interfaces::EngineError;
use crate::interfaces::NOT_FOUND_CODE;
use crate::interfaces::PlanAction;
use crate::interfaces::PlanSummary;
use crate::interfaces::PlannedChange;
use crate::interfaces::RemoteError;
use crate::interfaces::RemoteObject;
use crate::interfaces::RemoteResourceApi;
use crate::model::AttrPattern;
use crate::model::AttributeMap;
use crate::model::CaseStatus;
use crate::model::CompositeId;
use crate::model::Expected;
use crate::model::HarnessError;
use crate::model::ResourceAddress;
use crate::model::StepStatus;
use crate::model::TrackedResource;
use crate::model::TrackedState;
use crate::runtime::SuiteRunner;
use crate::runtime::checks::Check;
use crate::runtime::events::HarnessEventKind;
use crate::runtime::events::MemoryEventSink;
use crate::runtime::events::NoopEventSink;
use crate::runtime::step::LifecycleStep;
use crate::runtime::step::TestCase;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const PARENT: &str = "parent-1";

fn widget() -> ResourceAddress {
    ResourceAddress::new("fake_widget.test")
}

#[derive(Clone, Default)]
struct Store {
    objects: Arc<Mutex<BTreeMap<String, AttributeMap>>>,
}

impl Store {
    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn get(&self, id: &str) -> Option<AttributeMap> {
        self.objects.lock().unwrap().get(id).cloned()
    }
}

#[derive(Clone)]
struct Doc {
    value: String,
    reject: Option<String>,
}

fn doc(value: &str) -> Doc {
    Doc {
        value: value.to_string(),
        reject: None,
    }
}

fn rejected(message: &str) -> Doc {
    Doc {
        value: String::new(),
        reject: Some(message.to_string()),
    }
}

#[derive(Default)]
struct Engine {
    store: Store,
    state: TrackedState,
    next_id: u32,
    leak_on_destroy: bool,
    replace_on_update: bool,
}

fn tracked_from(id: &str, attributes: &AttributeMap) -> TrackedResource {
    TrackedResource::new(widget(), id).with_attributes(attributes.clone())
}

impl DeclarativeEngine for Engine {
    type Document = Doc;

    fn apply(&mut self, document: &Doc) -> Result<(), EngineError> {
        if let Some(message) = &document.reject {
            return Err(EngineError::Rejected(message.clone()));
        }
        let existing = self
            .state
            .get(&widget())
            .map(|resource| resource.id.clone())
            .filter(|id| self.store.get(id).is_some() && !self.replace_on_update);
        let id = existing.unwrap_or_else(|| {
            self.next_id += 1;
            format!("w{}", self.next_id)
        });
        let mut attributes = AttributeMap::new();
        attributes.insert("id".into(), id.clone());
        attributes.insert("parent_id".into(), PARENT.into());
        attributes.insert("value".into(), document.value.clone());
        self.store.objects.lock().unwrap().insert(id.clone(), attributes.clone());
        self.state.insert(tracked_from(&id, &attributes));
        Ok(())
    }

    fn plan(&mut self, document: &Doc) -> Result<PlanSummary, EngineError> {
        let action = match self.state.get(&widget()) {
            None => Some(PlanAction::Create),
            Some(resource) => match self.store.get(&resource.id) {
                None => Some(PlanAction::Create),
                Some(live) if live.get("value") != Some(&document.value) => Some(PlanAction::Update),
                Some(_) => None,
            },
        };
        Ok(PlanSummary {
            changes: action
                .map(|action| PlannedChange {
                    address: widget(),
                    action,
                })
                .into_iter()
                .collect(),
        })
    }

    fn import(
        &mut self,
        _document: &Doc,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<TrackedResource, EngineError> {
        let id = CompositeId::parse(import_id).map_err(|err| EngineError::Rejected(err.to_string()))?;
        let attributes = self
            .store
            .get(id.object_id())
            .ok_or_else(|| EngineError::Rejected("cannot import non-existent object".into()))?;
        Ok(TrackedResource::new(address.clone(), id.object_id()).with_attributes(attributes))
    }

    fn destroy(&mut self) -> Result<(), EngineError> {
        if !self.leak_on_destroy {
            for resource in self.state.iter() {
                self.store.objects.lock().unwrap().remove(&resource.id);
            }
        }
        self.state.clear();
        Ok(())
    }

    fn state(&self) -> &TrackedState {
        &self.state
    }
}

struct Object(AttributeMap);

impl RemoteObject for Object {
    fn attributes(&self) -> AttributeMap {
        self.0.clone()
    }
}

struct Remote {
    store: Store,
}

impl RemoteResourceApi for Remote {
    type Object = Object;

    fn resource_type(&self) -> &str {
        "fake_widget"
    }

    fn container_attribute(&self) -> &str {
        "parent_id"
    }

    fn fetch(&self, id: &CompositeId) -> Result<Object, RemoteError> {
        self.store.get(id.object_id()).map(Object).ok_or_else(|| RemoteError::NotFound {
            code: NOT_FOUND_CODE.into(),
            message: "missing".into(),
        })
    }

    fn delete(&self, id: &CompositeId) -> Result<(), RemoteError> {
        self.store.objects.lock().unwrap().remove(id.object_id()).map(|_| ()).ok_or_else(|| {
            RemoteError::NotFound {
                code: NOT_FOUND_CODE.into(),
                message: "missing".into(),
            }
        })
    }
}

fn verifier_with(engine: Engine, sink: Arc<MemoryEventSink>) -> LifecycleVerifier<Engine, Remote> {
    let remote = Remote {
        store: engine.store.clone(),
    };
    LifecycleVerifier::new(VerifierContext::new(engine, remote, sink))
}

fn verifier(engine: Engine) -> LifecycleVerifier<Engine, Remote> {
    verifier_with(engine, Arc::new(MemoryEventSink::new()))
}

fn value_checks(value: &str) -> Vec<Check> {
    vec![
        Check::exists(widget()),
        Check::stable_id(widget()),
        Check::tracked(widget(), "value", Expected::exact(value)),
        Check::remote(widget(), "value", Expected::exact(value)),
        Check::remote(widget(), "missing", Expected::Absent),
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn full_lifecycle_passes_and_tears_down() {
    let engine = Engine::default();
    let store = engine.store.clone();
    let sink = Arc::new(MemoryEventSink::new());
    let mut verifier = verifier_with(engine, Arc::clone(&sink));
    let case = TestCase::new("lifecycle")
        .step(LifecycleStep::apply(doc("one"), value_checks("one")))
        .step(LifecycleStep::import(widget()))
        .step(LifecycleStep::apply(doc("two"), value_checks("two")));

    let report = verifier.run_case(&case);

    assert_eq!(report.status, CaseStatus::Passed);
    assert!(report.steps.iter().all(|step| step.status == StepStatus::Passed));
    assert_eq!(store.len(), 0);
    let kinds = sink.kinds();
    assert_eq!(kinds.first(), Some(&HarnessEventKind::CaseStarted));
    assert_eq!(kinds.last(), Some(&HarnessEventKind::CaseFinished));
    assert!(kinds.contains(&HarnessEventKind::ImportVerified));
    assert!(kinds.contains(&HarnessEventKind::DestroyChecked));
}

#[test]
fn failed_check_skips_remaining_steps_and_still_tears_down() {
    let engine = Engine::default();
    let store = engine.store.clone();
    let mut verifier = verifier(engine);
    let case = TestCase::new("mismatch")
        .step(LifecycleStep::apply(doc("one"), value_checks("other")))
        .step(LifecycleStep::import(widget()));

    let report = verifier.run_case(&case);

    assert_eq!(report.status, CaseStatus::Failed);
    let failure = report.failure.unwrap();
    assert_eq!(failure.step, Some(0));
    assert_eq!(failure.kind, "assertion");
    assert!(failure.message.contains("expected \"other\", got \"one\""));
    assert_eq!(report.steps[1].status, StepStatus::Skipped);
    assert_eq!(store.len(), 0);
}

#[test]
fn absent_and_empty_are_distinct_in_checks() {
    let mut verifier = verifier(Engine::default());
    let case = TestCase::new("absent").step(LifecycleStep::apply(
        doc(""),
        vec![Check::remote(widget(), "value", Expected::Absent)],
    ));
    let report = verifier.run_case(&case);
    let failure = report.failure.unwrap();
    assert!(failure.message.contains("expected <absent>, got \"\""));
}

#[test]
fn update_replacing_the_object_breaks_stable_id() {
    let engine = Engine {
        replace_on_update: true,
        ..Engine::default()
    };
    let mut verifier = verifier(engine);
    let case = TestCase::new("replace")
        .step(LifecycleStep::apply(doc("one"), vec![Check::stable_id(widget())]))
        .step(LifecycleStep::apply(doc("two"), vec![Check::stable_id(widget())]));
    let report = verifier.run_case(&case);
    let failure = report.failure.unwrap();
    assert_eq!(failure.step, Some(1));
    assert!(failure.message.contains("attribute id"));
}

#[test]
fn expected_error_must_match() {
    let pattern = AttrPattern::new("must be set non-empty").unwrap();

    let mut matched = verifier(Engine::default());
    let case = TestCase::new("matched")
        .step(LifecycleStep::expect_error(rejected("uri must be set non-empty"), pattern.clone()));
    assert!(matched.run_case(&case).passed());

    let mut mismatched = verifier(Engine::default());
    let case = TestCase::new("mismatched")
        .step(LifecycleStep::expect_error(rejected("something else"), pattern.clone()));
    let report = mismatched.run_case(&case);
    assert_eq!(report.failure.unwrap().kind, "expected_error");

    let mut missing = verifier(Engine::default());
    let case = TestCase::new("missing").step(LifecycleStep::expect_error(doc("ok"), pattern));
    let report = missing.run_case(&case);
    assert!(report.failure.unwrap().message.contains("applied cleanly"));
}

#[test]
fn disappears_requires_a_recreating_plan() {
    let mut drift = verifier(Engine::default());
    let case = TestCase::new("drift").step(LifecycleStep::apply_expecting_drift(
        doc("one"),
        vec![Check::exists(widget()), Check::disappears(widget())],
    ));
    assert!(drift.run_case(&case).passed());

    let mut converged = verifier(Engine::default());
    let case = TestCase::new("converged").step(LifecycleStep::apply(
        doc("one"),
        vec![Check::exists(widget()), Check::disappears(widget())],
    ));
    let report = converged.run_case(&case);
    assert_eq!(report.failure.unwrap().kind, "unexpected_plan");
}

#[test]
fn leaked_object_fails_after_teardown() {
    let engine = Engine {
        leak_on_destroy: true,
        ..Engine::default()
    };
    let mut verifier = verifier(engine);
    let case = TestCase::new("leak").step(LifecycleStep::apply(doc("one"), Vec::new()));
    let report = verifier.run_case(&case);
    let failure = report.failure.unwrap();
    assert_eq!(failure.step, None);
    assert_eq!(failure.kind, "still_exists");
}

#[test]
fn step_failure_wins_over_cleanup_failure() {
    let engine = Engine {
        leak_on_destroy: true,
        ..Engine::default()
    };
    let mut verifier = verifier(engine);
    let case = TestCase::new("both").step(LifecycleStep::apply(doc("one"), value_checks("two")));
    let report = verifier.run_case(&case);
    assert_eq!(report.failure.unwrap().kind, "assertion");
    assert_eq!(report.cleanup_notes.len(), 1);
    assert!(report.cleanup_notes[0].contains("still exists"));
}

#[test]
fn import_before_apply_is_an_invalid_case() {
    let mut verifier = verifier(Engine::default());
    let case = TestCase::<Doc>::new("import-first").step(LifecycleStep::import(widget()));
    let report = verifier.run_case(&case);
    assert_eq!(report.failure.unwrap().kind, "invalid_case");
}

#[test]
fn destroy_check_modes_differ_on_later_survivors() {
    let store = Store::default();
    let mut leaked = AttributeMap::new();
    leaked.insert("parent_id".into(), PARENT.into());
    store.objects.lock().unwrap().insert("w2".into(), leaked.clone());

    let mut snapshot = TrackedState::new();
    snapshot.insert(
        TrackedResource::new(ResourceAddress::new("fake_widget.a"), "w1")
            .with_attributes(leaked.clone()),
    );
    snapshot.insert(
        TrackedResource::new(ResourceAddress::new("fake_widget.b"), "w2").with_attributes(leaked),
    );

    let build = |mode| {
        let engine = Engine {
            store: store.clone(),
            ..Engine::default()
        };
        let remote = Remote {
            store: store.clone(),
        };
        let ctx = VerifierContext::new(engine, remote, Arc::new(NoopEventSink)).with_options(
            VerifierOptions {
                destroy_check: mode,
            },
        );
        LifecycleVerifier::new(ctx)
    };

    let err = build(DestroyCheckMode::Exhaustive).check_destroyed(&snapshot).unwrap_err();
    assert!(matches!(err, HarnessError::StillExists { ref id, .. } if id == "parent-1/w2"));
    build(DestroyCheckMode::FirstMatch).check_destroyed(&snapshot).unwrap();
}

#[test]
fn composite_id_requires_container_attribute() {
    let resource = TrackedResource::new(widget(), "w1");
    let err = composite_id_for(&resource, "parent_id").unwrap_err();
    assert!(err.to_string().contains("has no parent_id"));

    let resource = TrackedResource::new(widget(), "");
    let err = composite_id_for(&resource, "parent_id").unwrap_err();
    assert!(err.to_string().contains("no id is set"));
}

#[test]
fn import_comparison_honors_ignore_prefixes() {
    let mut applied_attrs = AttributeMap::new();
    applied_attrs.insert("name".into(), "a".into());
    applied_attrs.insert("arns.#".into(), "1".into());
    applied_attrs.insert("arns.0".into(), "x".into());
    let mut imported_attrs = applied_attrs.clone();
    imported_attrs.remove("arns.0");
    imported_attrs.insert("arns.#".into(), "0".into());

    let applied = tracked_from("w1", &applied_attrs);
    let imported = tracked_from("w1", &imported_attrs);

    let err = verify_import(&applied, &imported, &[]).unwrap_err();
    assert!(matches!(err, HarnessError::ImportMismatch { ref field, .. } if field == "arns.#"));
    verify_import(&applied, &imported, &["arns".to_string()]).unwrap();

    let other = tracked_from("w2", &applied_attrs);
    let err = verify_import(&applied, &other, &[]).unwrap_err();
    assert!(matches!(err, HarnessError::ImportMismatch { ref field, .. } if field == "id"));
}

#[test]
fn suite_runner_preserves_case_order() {
    let cases: Vec<TestCase<Doc>> = (0 .. 6)
        .map(|i| {
            let value = format!("v{i}");
            TestCase::new(format!("case-{i}"))
                .step(LifecycleStep::apply(doc(&value), value_checks(&value)))
        })
        .collect();
    let report = SuiteRunner::new(3).run(&cases, |case| {
        if case.name == "case-4" {
            return Err(HarnessError::InvalidCase("no backend".into()));
        }
        Ok(verifier(Engine::default()))
    });
    let names: Vec<&str> = report.cases.iter().map(|case| case.case.as_str()).collect();
    assert_eq!(names, vec!["case-0", "case-1", "case-2", "case-3", "case-4", "case-5"]);
    assert_eq!(report.passed(), 5);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.case("case-4").unwrap().failure.as_ref().unwrap().kind, "invalid_case");
}
