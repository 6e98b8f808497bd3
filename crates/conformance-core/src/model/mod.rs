// crates/conformance-core/src/model/mod.rs
// ============================================================================
// Module: Conformance Model
// Description: Data types shared by the verifier and its backends.
// Purpose: Group identifiers, matchers, tracked state, reports, and errors.
// Dependencies: rand, regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The model layer holds plain data: how resources are addressed, how an
//! expected attribute value is described, what the engine tracks, and how a
//! run is reported. Nothing here performs I/O.

pub mod error;
pub mod expected;
pub mod identifiers;
pub mod naming;
pub mod report;
pub mod state;

pub use error::AttributeSource;
pub use error::HarnessError;
pub use expected::AttrPattern;
pub use expected::Expected;
pub use expected::ExpectedAttributes;
pub use expected::PatternError;
pub use expected::describe_actual;
pub use identifiers::CompositeId;
pub use identifiers::CompositeIdError;
pub use identifiers::ResourceAddress;
pub use naming::NameGenerator;
pub use naming::random_with_prefix;
pub use report::CaseReport;
pub use report::CaseStatus;
pub use report::FailureRecord;
pub use report::StepRecord;
pub use report::StepStatus;
pub use report::SuiteReport;
pub use state::AttributeMap;
pub use state::TrackedResource;
pub use state::TrackedState;
pub use state::flatten_attributes;
