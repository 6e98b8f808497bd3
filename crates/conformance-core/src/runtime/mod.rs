// crates/conformance-core/src/runtime/mod.rs
// ============================================================================
// Module: Conformance Runtime
// Description: Lifecycle verifier, case definitions, suite runner, and events.
// Purpose: Execute test cases against an engine and a remote service.
// Dependencies: crate::interfaces, crate::model, serde, serde_json
// ============================================================================

//! ## Overview
//! The runtime executes [`TestCase`]s. A case is an ordered list of
//! [`LifecycleStep`]s; steps run in order and stop at the first failure.
//! Teardown runs exactly once per case no matter how the steps ended, and
//! the destroy check uses a snapshot of tracked state taken before teardown.

pub mod checks;
pub mod events;
pub mod step;
pub mod suite;
pub mod verifier;

pub use checks::Check;
pub use events::FileEventSink;
pub use events::HarnessEvent;
pub use events::HarnessEventKind;
pub use events::HarnessEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use step::LifecycleStep;
pub use step::PlanExpectation;
pub use step::TestCase;
pub use suite::SuiteRunner;
pub use verifier::DestroyCheckMode;
pub use verifier::LifecycleVerifier;
pub use verifier::VerifierContext;
pub use verifier::VerifierOptions;
