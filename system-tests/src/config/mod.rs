// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for conformance system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: conformance-config
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ALLOW_OVERWRITE_VAR;
pub use env::NAME_ROOT_VAR;
pub use env::RUN_ROOT_VAR;
pub use env::SystemTestConfig;
