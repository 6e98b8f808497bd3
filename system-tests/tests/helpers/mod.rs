// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for authorizer conformance system-tests.
// Purpose: Provide suite runners and artifact utilities.
// Dependencies: system-tests, conformance-core, conformance-terraform
// ============================================================================

//! ## Overview
//! Shared helpers for authorizer conformance system-tests.
//! Invariants:
//! - Live suites never run unless the acceptance gate is set.
//! - Every run writes a summary and the full case report to its run root.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod runner;
