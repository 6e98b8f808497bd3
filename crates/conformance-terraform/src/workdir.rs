// crates/conformance-terraform/src/workdir.rs
// ============================================================================
// Module: Terraform Work Directories
// Description: Per-case working directories and the files staged into them.
// Purpose: Give every Terraform invocation an isolated, reproducible root.
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! Each engine owns one work directory holding `main.tf`, a generated
//! `provider.tf`, and a copy of the fixture tree under `test-fixtures/`.
//! Import round-trips run in numbered subdirectories so they never touch
//! the applied state. Directories are removed on drop unless kept for
//! debugging.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::TerraformError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File receiving the rendered document.
pub const MAIN_FILE: &str = "main.tf";
/// File receiving the provider block.
pub const PROVIDER_FILE: &str = "provider.tf";
/// Directory fixtures are copied into, relative to the work directory.
pub const FIXTURES_SUBDIR: &str = "test-fixtures";
/// Prefix of every generated work directory.
const WORK_DIR_PREFIX: &str = "authorizer-conformance-";

// ============================================================================
// SECTION: Work Directory
// ============================================================================

/// Work directory owned by one engine.
#[derive(Debug)]
pub struct WorkDir {
    /// Directory path.
    path: PathBuf,
    /// Guard removing the directory on drop; `None` when kept.
    _guard: Option<TempDir>,
}

impl WorkDir {
    /// Creates a fresh directory under `root`, or the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::WorkDir`] when the directory cannot be
    /// created.
    pub fn create(root: Option<&Path>, keep: bool) -> Result<Self, TerraformError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORK_DIR_PREFIX);
        let temp = match root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|err| work_dir_error(root, &err))?;
                builder.tempdir_in(root).map_err(|err| work_dir_error(root, &err))?
            }
            None => builder.tempdir().map_err(|err| TerraformError::WorkDir(err.to_string()))?,
        };
        if keep {
            return Ok(Self {
                path: temp.keep(),
                _guard: None,
            });
        }
        Ok(Self {
            path: temp.path().to_path_buf(),
            _guard: Some(temp),
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates and returns a named subdirectory.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::WorkDir`] when the directory cannot be
    /// created.
    pub fn subdir(&self, name: &str) -> Result<PathBuf, TerraformError> {
        let path = self.path.join(name);
        fs::create_dir_all(&path).map_err(|err| work_dir_error(&path, &err))?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Staging
// ============================================================================

/// Writes the document and provider block into `dir` and copies fixtures
/// the first time.
///
/// # Errors
///
/// Returns [`TerraformError::WorkDir`] when a write or copy fails.
pub fn stage(
    dir: &Path,
    document: &str,
    provider: &str,
    fixtures: Option<&Path>,
) -> Result<(), TerraformError> {
    write_file(&dir.join(MAIN_FILE), document)?;
    write_file(&dir.join(PROVIDER_FILE), provider)?;
    if let Some(fixtures) = fixtures {
        let target = dir.join(FIXTURES_SUBDIR);
        if !target.exists() {
            copy_tree(fixtures, &target)?;
        }
    }
    Ok(())
}

/// Writes one file.
fn write_file(path: &Path, content: &str) -> Result<(), TerraformError> {
    fs::write(path, content).map_err(|err| work_dir_error(path, &err))
}

/// Recursively copies `src` into `dst`.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), TerraformError> {
    fs::create_dir_all(dst).map_err(|err| work_dir_error(dst, &err))?;
    let entries = fs::read_dir(src).map_err(|err| work_dir_error(src, &err))?;
    for entry in entries {
        let entry = entry.map_err(|err| work_dir_error(src, &err))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|err| work_dir_error(&from, &err))?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|err| work_dir_error(&from, &err))?;
        }
    }
    Ok(())
}

/// Formats a filesystem failure with its path.
fn work_dir_error(path: &Path, err: &std::io::Error) -> TerraformError {
    TerraformError::WorkDir(format!("{}: {err}", path.display()))
}

// ============================================================================
// SECTION: Provider Block
// ============================================================================

/// Renders the `aws` provider block for the configured account settings.
#[must_use]
pub fn render_provider(
    region: Option<&str>,
    profile: Option<&str>,
    endpoint: Option<&str>,
) -> String {
    let mut out = String::from("provider \"aws\" {\n");
    if let Some(region) = region {
        out.push_str(&format!("  region = {}\n", quote(region)));
    }
    if let Some(profile) = profile {
        out.push_str(&format!("  profile = {}\n", quote(profile)));
    }
    if let Some(endpoint) = endpoint {
        out.push_str(&format!("\n  endpoints {{\n    apigateway = {}\n  }}\n", quote(endpoint)));
    }
    out.push_str("}\n");
    out
}

/// Quotes a value as an HCL string literal.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"").replace("${", "$${");
    format!("\"{escaped}\"")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
