// crates/conformance-config/src/env.rs
// ============================================================================
// Module: Conformance Environment
// Description: Environment-backed overrides and the acceptance gate.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid
//! silent misconfiguration. Invalid UTF-8, empty values, and unrecognized
//! literals fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceEnv {
    /// Configuration file path.
    ConfigPath,
    /// Acceptance gate for live runs (`true`/`false` or `1`/`0`).
    Acceptance,
    /// Region override.
    Region,
    /// Parallelism override (positive integer).
    Parallelism,
    /// Terraform binary override.
    TerraformBinary,
}

impl ConformanceEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "AUTHORIZER_CONFORMANCE_CONFIG",
            Self::Acceptance => "AUTHORIZER_CONFORMANCE_ACC",
            Self::Region => "AUTHORIZER_CONFORMANCE_REGION",
            Self::Parallelism => "AUTHORIZER_CONFORMANCE_PARALLELISM",
            Self::TerraformBinary => "AUTHORIZER_CONFORMANCE_TERRAFORM",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Region override.
    pub region: Option<String>,
    /// Parallelism override.
    pub parallelism: Option<usize>,
    /// Terraform binary override.
    pub terraform_binary: Option<PathBuf>,
}

impl EnvOverrides {
    /// Loads overrides from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8, is
    /// empty, or fails parsing.
    pub fn load() -> Result<Self, ConfigError> {
        let region = read_env_nonempty(ConformanceEnv::Region.as_str())?;
        let parallelism = read_env_nonempty(ConformanceEnv::Parallelism.as_str())?
            .map(|value| parse_positive(ConformanceEnv::Parallelism.as_str(), &value))
            .transpose()?;
        let terraform_binary =
            read_env_nonempty(ConformanceEnv::TerraformBinary.as_str())?.map(PathBuf::from);
        Ok(Self {
            region,
            parallelism,
            terraform_binary,
        })
    }
}

/// Returns true when live acceptance runs are enabled.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the gate is set to an unrecognized
/// value.
pub fn acceptance_enabled() -> Result<bool, ConfigError> {
    let name = ConformanceEnv::Acceptance.as_str();
    parse_bool_env(name, read_env_nonempty(name)?)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive integer.
pub(crate) fn parse_positive(name: &str, raw: &str) -> Result<usize, ConfigError> {
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

/// Parses a boolean literal; unset means false.
pub(crate) fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid(format!("{name} must be 1, 0, true, or false")))
}
