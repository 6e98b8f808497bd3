// crates/conformance-terraform/src/error.rs
// ============================================================================
// Module: Terraform Errors
// Description: Failures raised while driving the Terraform CLI.
// Purpose: Keep CLI diagnostics intact up to the engine boundary.
// Dependencies: conformance-core, thiserror
// ============================================================================

//! ## Overview
//! [`TerraformError`] distinguishes a command Terraform ran and rejected
//! from a command that could not run at all. Only rejections become
//! [`EngineError::Rejected`], whose text expect-error steps match.

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::EngineError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terraform adapter errors.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The binary could not be started.
    #[error("failed to run {binary}: {message}")]
    Spawn {
        /// Binary path as configured.
        binary: String,
        /// OS error text.
        message: String,
    },
    /// Terraform exited unsuccessfully.
    #[error("{diagnostics}")]
    Failed {
        /// Subcommand that failed, e.g. `apply`.
        command: String,
        /// Exit code, when the process exited normally.
        code: Option<i32>,
        /// Diagnostic output without color codes.
        diagnostics: String,
    },
    /// Work directory or fixture setup failed.
    #[error("terraform work dir error: {0}")]
    WorkDir(String),
    /// Terraform printed JSON the adapter does not understand.
    #[error("terraform json output invalid: {0}")]
    Json(String),
}

impl From<TerraformError> for EngineError {
    fn from(err: TerraformError) -> Self {
        match err {
            TerraformError::Failed {
                diagnostics, ..
            } => Self::Rejected(diagnostics),
            TerraformError::Spawn {
                ..
            }
            | TerraformError::WorkDir(_) => Self::Io(err.to_string()),
            TerraformError::Json(_) => Self::Output(err.to_string()),
        }
    }
}
