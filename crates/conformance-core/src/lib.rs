// crates/conformance-core/src/lib.rs
// ============================================================================
// Module: Conformance Core Library
// Description: Backend-agnostic lifecycle verifier for declarative resources.
// Purpose: Drive apply/check/import/destroy cycles and report conformance.
// Dependencies: rand, regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Conformance core verifies that a declarative engine and a remote service
//! agree on the lifecycle of one resource type. A [`TestCase`] is an ordered
//! list of [`LifecycleStep`]s; the [`LifecycleVerifier`] applies each step
//! through a [`DeclarativeEngine`], checks the engine's tracked state and the
//! live object behind a [`RemoteResourceApi`], and always tears the
//! deployment down before confirming that nothing of the resource type
//! survived.
//!
//! The crate does not know about any particular cloud or configuration
//! language. Resource-specific crates supply configuration documents, remote
//! object shapes, and case catalogs.

pub mod interfaces;
pub mod model;
pub mod runtime;

pub use interfaces::DeclarativeEngine;
pub use interfaces::EngineError;
pub use interfaces::NOT_FOUND_CODE;
pub use interfaces::PlanAction;
pub use interfaces::PlanSummary;
pub use interfaces::PlannedChange;
pub use interfaces::RemoteError;
pub use interfaces::RemoteObject;
pub use interfaces::RemoteResourceApi;
pub use interfaces::RenderedConfig;
pub use interfaces::classify_service_error;
pub use model::AttrPattern;
pub use model::AttributeMap;
pub use model::AttributeSource;
pub use model::CaseReport;
pub use model::CaseStatus;
pub use model::CompositeId;
pub use model::CompositeIdError;
pub use model::Expected;
pub use model::ExpectedAttributes;
pub use model::FailureRecord;
pub use model::HarnessError;
pub use model::NameGenerator;
pub use model::PatternError;
pub use model::ResourceAddress;
pub use model::StepRecord;
pub use model::StepStatus;
pub use model::SuiteReport;
pub use model::TrackedResource;
pub use model::TrackedState;
pub use model::describe_actual;
pub use model::flatten_attributes;
pub use model::random_with_prefix;
pub use runtime::Check;
pub use runtime::DestroyCheckMode;
pub use runtime::FileEventSink;
pub use runtime::HarnessEvent;
pub use runtime::HarnessEventKind;
pub use runtime::HarnessEventSink;
pub use runtime::LifecycleStep;
pub use runtime::LifecycleVerifier;
pub use runtime::MemoryEventSink;
pub use runtime::NoopEventSink;
pub use runtime::PlanExpectation;
pub use runtime::StderrEventSink;
pub use runtime::SuiteRunner;
pub use runtime::TestCase;
pub use runtime::VerifierContext;
pub use runtime::VerifierOptions;
