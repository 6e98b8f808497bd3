// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Output and naming settings for acceptance runs.
// Purpose: Decide where run output lands and how live resources are named.
// Dependencies: conformance-config
// ============================================================================

//! ## Overview
//! Three optional variables steer acceptance runs. Values are trimmed; set
//! but empty values are rejected rather than treated as unset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use conformance_config::read_env_strict;

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Directory that replaces the timestamped default run root.
pub const RUN_ROOT_VAR: &str = "AUTHORIZER_CONFORMANCE_SYSTEM_TEST_RUN_ROOT";

/// Root for generated resource names, ahead of the harness name prefix.
pub const NAME_ROOT_VAR: &str = "AUTHORIZER_CONFORMANCE_SYSTEM_TEST_NAME_ROOT";

/// Permits writing into a run root that already exists.
pub const ALLOW_OVERWRITE_VAR: &str = "AUTHORIZER_CONFORMANCE_SYSTEM_TEST_ALLOW_OVERWRITE";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Acceptance run settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Run root override.
    pub run_root: Option<PathBuf>,
    /// Resource name root: a lowercase letter, then lowercase letters, digits,
    /// or `-`.
    pub name_root: Option<String>,
    /// Whether an existing run root may be reused.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Reads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable when a value is not
    /// UTF-8, is blank, or does not parse.
    pub fn load() -> Result<Self, String> {
        let run_root = setting(RUN_ROOT_VAR)?.map(PathBuf::from);
        let name_root = setting(NAME_ROOT_VAR)?.map(|value| checked_name_root(&value)).transpose()?;
        let allow_overwrite = match setting(ALLOW_OVERWRITE_VAR)?.as_deref() {
            None | Some("0") => false,
            Some("1") => true,
            Some(value) if value.eq_ignore_ascii_case("false") => false,
            Some(value) if value.eq_ignore_ascii_case("true") => true,
            Some(_) => {
                return Err(format!("{ALLOW_OVERWRITE_VAR} must be 1, 0, true, or false"));
            }
        };
        Ok(Self {
            run_root,
            name_root,
            allow_overwrite,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the trimmed value of `var`, failing when it is set but blank.
fn setting(var: &str) -> Result<Option<String>, String> {
    let Some(raw) = read_env_strict(var).map_err(|err| err.to_string())? else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Err(format!("{var} must not be empty"));
    }
    Ok(Some(value.to_string()))
}

/// Name roots end up in API Gateway, Lambda, IAM, and Cognito names.
fn checked_name_root(value: &str) -> Result<String, String> {
    let mut chars = value.chars();
    let leads_with_letter = chars.next().is_some_and(|ch| ch.is_ascii_lowercase());
    if leads_with_letter
        && chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
    {
        Ok(value.to_string())
    } else {
        Err(format!("{NAME_ROOT_VAR} must be a lowercase letter followed by a-z, 0-9, or '-'"))
    }
}
