// crates/conformance-config/src/lib.rs
// ============================================================================
// Module: Conformance Config Library
// Description: Canonical configuration model for the conformance harness.
// Purpose: Single source of truth for authorizer-conformance.toml semantics.
// Dependencies: conformance-core, serde, toml
// ============================================================================

//! ## Overview
//! `conformance-config` defines the harness configuration: verifier
//! settings, service client settings, Terraform engine settings, and the
//! event sink. It also owns environment overrides and the acceptance gate
//! that live runs must pass before touching a real account.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AwsConfig;
pub use config::ConfigError;
pub use config::ConformanceConfig;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::DEFAULT_PARALLELISM;
pub use config::EventSinkKind;
pub use config::EventsConfig;
pub use config::HarnessConfig;
pub use config::MAX_PARALLELISM;
pub use config::TerraformConfig;
pub use env::ConformanceEnv;
pub use env::EnvOverrides;
pub use env::acceptance_enabled;
pub use env::read_env_strict;
