// crates/conformance-config/src/config.rs
// ============================================================================
// Module: Conformance Configuration
// Description: Configuration loading and validation for the harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: conformance-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits, then overlaid with environment overrides. When no path is given
//! and the default file does not exist, defaults apply. An explicitly named
//! file that cannot be read is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use conformance_core::DestroyCheckMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::env::ConformanceEnv;
use crate::env::EnvOverrides;
use crate::env::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "authorizer-conformance.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of one path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default number of cases run concurrently.
pub const DEFAULT_PARALLELISM: usize = 4;
/// Maximum number of cases run concurrently.
pub const MAX_PARALLELISM: usize = 64;
/// Maximum length of a name prefix override.
pub(crate) const MAX_NAME_PREFIX_LENGTH: usize = 32;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Verifier settings.
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Service client settings.
    #[serde(default)]
    pub aws: AwsConfig,
    /// Terraform engine settings.
    #[serde(default)]
    pub terraform: TerraformConfig,
    /// Event sink settings.
    #[serde(default)]
    pub events: EventsConfig,
}

impl ConformanceConfig {
    /// Loads configuration using the default resolution rules, then applies
    /// environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path)? {
            Resolved::Explicit(path) => Self::read(&path)?,
            Resolved::Default(path) if path.exists() => Self::read(&path)?,
            Resolved::Default(_) => Self::default(),
        };
        config.apply_overrides(&EnvOverrides::load()?);
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration text without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one file under the size limit.
    fn read(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays environment overrides.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) {
        if let Some(region) = &overrides.region {
            self.aws.region = Some(region.clone());
        }
        if let Some(parallelism) = overrides.parallelism {
            self.harness.parallelism = parallelism;
        }
        if let Some(binary) = &overrides.terraform_binary {
            self.terraform.binary.clone_from(binary);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.harness.validate()?;
        self.aws.validate()?;
        self.terraform.validate()?;
        self.events.validate()?;
        Ok(())
    }
}

/// Verifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Cases run concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Post-destroy check mode.
    #[serde(default)]
    pub destroy_check: DestroyCheckMode,
    /// Root of generated resource names.
    #[serde(default)]
    pub name_prefix: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            destroy_check: DestroyCheckMode::default(),
            name_prefix: None,
        }
    }
}

impl HarnessConfig {
    /// Validates harness settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(ConfigError::Invalid(format!(
                "harness.parallelism must be between 1 and {MAX_PARALLELISM}"
            )));
        }
        if let Some(prefix) = &self.name_prefix {
            if prefix.is_empty() || prefix.len() > MAX_NAME_PREFIX_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "harness.name_prefix must be 1 to {MAX_NAME_PREFIX_LENGTH} characters"
                )));
            }
            if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
                return Err(ConfigError::Invalid(
                    "harness.name_prefix may only contain ASCII letters, digits, and '-'"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Default parallelism for serde.
const fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

/// Service client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// Region (defaults to the SDK environment chain).
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override (LocalStack or another compatible endpoint).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Named credentials profile.
    #[serde(default)]
    pub profile: Option<String>,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl AwsConfig {
    /// Validates service client settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(ConfigError::Invalid("aws.region must be non-empty".to_string()));
        }
        if let Some(profile) = &self.profile
            && profile.trim().is_empty()
        {
            return Err(ConfigError::Invalid("aws.profile must be non-empty".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "aws.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "aws.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Terraform engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    /// Terraform binary name or path.
    #[serde(default = "default_terraform_binary")]
    pub binary: PathBuf,
    /// Parent of per-case work directories (defaults to the system temp dir).
    #[serde(default)]
    pub work_root: Option<PathBuf>,
    /// Directory copied into every work directory as `test-fixtures`.
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,
    /// Shared provider plugin cache.
    #[serde(default)]
    pub plugin_cache_dir: Option<PathBuf>,
    /// Keep work directories after each case.
    #[serde(default)]
    pub keep_work_dirs: bool,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: default_terraform_binary(),
            work_root: None,
            fixtures_dir: None,
            plugin_cache_dir: None,
            keep_work_dirs: false,
        }
    }
}

impl TerraformConfig {
    /// Validates engine settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("terraform.binary", &self.binary)?;
        let optional = [
            ("terraform.work_root", &self.work_root),
            ("terraform.fixtures_dir", &self.fixtures_dir),
            ("terraform.plugin_cache_dir", &self.plugin_cache_dir),
        ];
        for (field, value) in optional {
            if let Some(path) = value {
                validate_path_string(field, path)?;
            }
        }
        Ok(())
    }
}

/// Default Terraform binary for serde.
fn default_terraform_binary() -> PathBuf {
    PathBuf::from("terraform")
}

/// Event sink kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events discarded.
    #[default]
    None,
}

/// Event sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: EventSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl EventsConfig {
    /// Validates event sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (EventSinkKind::File, None) => Err(ConfigError::Invalid(
                "events.path is required when events.sink is file".to_string(),
            )),
            (EventSinkKind::File, Some(path)) => validate_path_string("events.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "events.path is only valid when events.sink is file".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Configuration path and how it was chosen.
enum Resolved {
    /// Named by the caller or the environment.
    Explicit(PathBuf),
    /// Fallback file name.
    Default(PathBuf),
}

/// Resolves the config path from the argument, env, or default name.
fn resolve_path(path: Option<&Path>) -> Result<Resolved, ConfigError> {
    if let Some(path) = path {
        return Ok(Resolved::Explicit(path.to_path_buf()));
    }
    if let Some(env_path) = read_env_strict(ConformanceEnv::ConfigPath.as_str())? {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Resolved::Explicit(PathBuf::from(env_path)));
    }
    Ok(Resolved::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path against length constraints.
fn validate_path_string(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
