// crates/apigw-authorizer/src/lib.rs
// ============================================================================
// Module: API Gateway Authorizer Conformance
// Description: Authorizer domain for the lifecycle conformance harness.
// Purpose: Define configurations, expectations, and the simulated backend.
// Dependencies: conformance-core, regex, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate binds the generic verifier in `conformance-core` to API Gateway
//! authorizers. It owns the scenario matrix and HCL generator
//! ([`config`]), the live object shape ([`model`]), type-dependent argument
//! rules ([`validation`]), the six conformance cases ([`catalog`]), and an
//! in-process backend that behaves like Terraform plus API Gateway
//! ([`sim`]).
//!
//! Live backends live in `conformance-terraform` and `conformance-aws`.

pub mod catalog;
pub mod config;
pub mod model;
pub mod sim;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::SuiteName;
pub use catalog::build_all;
pub use catalog::build_case;
pub use config::AuthorizerConfig;
pub use config::AuthorizerDecl;
pub use config::NameSeeds;
pub use config::Scenario;
pub use config::StackDecl;
pub use config::generate;
pub use model::AUTHORIZER_RESOURCE_TYPE;
pub use model::AuthorizerType;
pub use model::CONTAINER_ATTRIBUTE;
pub use model::RemoteAuthorizer;
pub use model::authorizer_address;
pub use model::tracked_attributes;
pub use sim::SimFaults;
pub use sim::SimulatedApiGateway;
pub use sim::SimulatedCloud;
pub use sim::SimulatedEngine;
pub use validation::AuthorizerValidationError;
pub use validation::validate_authorizer;
