// system-tests/src/lib.rs
// ============================================================================
// Module: Authorizer Conformance System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common settings for the acceptance test binary.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the acceptance suites in
//! `system-tests/tests`. Live suites only run when the acceptance gate is
//! set; everything here is safe to load without cloud credentials.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
