// crates/conformance-terraform/src/lib.rs
// ============================================================================
// Module: Conformance Terraform Adapter
// Description: Declarative engine backed by the Terraform CLI.
// Purpose: Drive real provider lifecycles for live conformance runs.
// Dependencies: conformance-core, serde_json, tempfile
// ============================================================================

//! ## Overview
//! The adapter runs `init`, `apply`, `plan`, `import`, and `destroy` in an
//! isolated work directory per case and reads results back through
//! Terraform's JSON output. Engine rejections keep Terraform's diagnostic
//! text so expected-error steps can match provider messages verbatim.

pub mod engine;
pub mod error;
pub mod show;
pub mod workdir;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::TerraformEngine;
pub use engine::TerraformSettings;
pub use error::TerraformError;
pub use show::parse_plan;
pub use show::parse_state;
pub use workdir::WorkDir;
