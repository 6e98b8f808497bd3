// crates/conformance-terraform/src/engine.rs
// ============================================================================
// Module: Terraform Engine
// Description: DeclarativeEngine implementation over the Terraform CLI.
// Purpose: Run conformance cases against the real provider and service.
// Dependencies: conformance-config, conformance-core, std::process
// ============================================================================

//! ## Overview
//! [`TerraformEngine`] stages each document into its work directory and
//! shells out to Terraform with automation settings. Tracked state is
//! reloaded from `terraform show -json` after every apply and destroy, so
//! a partially failed apply still leaves accurate state for teardown.
//!
//! # Invariants
//! - Every command runs non-interactively without color codes.
//! - Imports run in fresh `import-N` directories with their own state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use conformance_config::ConformanceConfig;
use conformance_core::DeclarativeEngine;
use conformance_core::EngineError;
use conformance_core::PlanSummary;
use conformance_core::RenderedConfig;
use conformance_core::ResourceAddress;
use conformance_core::TrackedResource;
use conformance_core::TrackedState;

use crate::error::TerraformError;
use crate::show::parse_imported;
use crate::show::parse_plan;
use crate::show::parse_state;
use crate::workdir::WorkDir;
use crate::workdir::render_provider;
use crate::workdir::stage;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Saved plan file name inside the work directory.
const PLAN_FILE: &str = "conformance.tfplan";
/// Arguments shared by `init`.
const INIT_ARGS: [&str; 2] = ["-input=false", "-no-color"];
/// Arguments shared by `apply` and `destroy`.
const AUTO_APPROVE_ARGS: [&str; 3] = ["-auto-approve", "-input=false", "-no-color"];
/// `-detailed-exitcode` status meaning changes are pending.
const PLAN_HAS_CHANGES: i32 = 2;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Settings for one Terraform engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformSettings {
    /// Terraform binary.
    pub binary: PathBuf,
    /// Root for work directories; the system temp dir when unset.
    pub work_root: Option<PathBuf>,
    /// Fixture tree copied to `test-fixtures/`.
    pub fixtures_dir: Option<PathBuf>,
    /// Shared provider plugin cache.
    pub plugin_cache_dir: Option<PathBuf>,
    /// Keep work directories after the engine drops.
    pub keep_work_dirs: bool,
    /// Provider region.
    pub region: Option<String>,
    /// Provider credentials profile.
    pub profile: Option<String>,
    /// API Gateway endpoint override.
    pub endpoint: Option<String>,
}

impl TerraformSettings {
    /// Builds settings from the `[terraform]` and `[aws]` sections.
    #[must_use]
    pub fn from_config(config: &ConformanceConfig) -> Self {
        Self {
            binary: config.terraform.binary.clone(),
            work_root: config.terraform.work_root.clone(),
            fixtures_dir: config.terraform.fixtures_dir.clone(),
            plugin_cache_dir: config.terraform.plugin_cache_dir.clone(),
            keep_work_dirs: config.terraform.keep_work_dirs,
            region: config.aws.region.clone(),
            profile: config.aws.profile.clone(),
            endpoint: config.aws.endpoint.clone(),
        }
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Terraform-backed declarative engine for documents of type `D`.
#[derive(Debug)]
pub struct TerraformEngine<D> {
    /// Engine settings.
    settings: TerraformSettings,
    /// Rendered provider block.
    provider: String,
    /// Main work directory.
    work: WorkDir,
    /// True once `init` succeeded in the main directory.
    initialized: bool,
    /// Imports issued so far.
    imports: usize,
    /// State as of the last completed command.
    state: TrackedState,
    /// Document type marker.
    _document: PhantomData<fn(&D)>,
}

impl<D> TerraformEngine<D> {
    /// Creates an engine with a fresh work directory.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::WorkDir`] when the directory cannot be
    /// created.
    pub fn new(settings: TerraformSettings) -> Result<Self, TerraformError> {
        let work = WorkDir::create(settings.work_root.as_deref(), settings.keep_work_dirs)?;
        let provider = render_provider(
            settings.region.as_deref(),
            settings.profile.as_deref(),
            settings.endpoint.as_deref(),
        );
        Ok(Self {
            settings,
            provider,
            work,
            initialized: false,
            imports: 0,
            state: TrackedState::new(),
            _document: PhantomData,
        })
    }

    /// Returns the main work directory.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    /// Stages `text` into the main directory and initializes it once.
    fn prepare(&mut self, text: &str) -> Result<(), TerraformError> {
        let dir = self.work.path().to_path_buf();
        stage(&dir, text, &self.provider, self.settings.fixtures_dir.as_deref())?;
        if !self.initialized {
            self.run_checked(&dir, "init", &INIT_ARGS)?;
            self.initialized = true;
        }
        Ok(())
    }

    /// Reloads tracked state from the main directory.
    fn refresh_state(&mut self) -> Result<(), TerraformError> {
        let dir = self.work.path().to_path_buf();
        let json = self.run_checked(&dir, "show", &["-json", "-no-color"])?;
        self.state = parse_state(&json)?;
        Ok(())
    }

    /// Runs a subcommand and returns its raw output.
    fn run(&self, dir: &Path, command: &str, args: &[&str]) -> Result<Output, TerraformError> {
        let mut process = Command::new(&self.settings.binary);
        process
            .arg(command)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .env("TF_IN_AUTOMATION", "1")
            .env("TF_INPUT", "0");
        if let Some(cache) = &self.settings.plugin_cache_dir {
            process.env("TF_PLUGIN_CACHE_DIR", cache);
        }
        process.output().map_err(|err| TerraformError::Spawn {
            binary: self.settings.binary.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Runs a subcommand and returns stdout when it succeeds.
    fn run_checked(&self, dir: &Path, command: &str, args: &[&str]) -> Result<String, TerraformError> {
        let output = self.run(dir, command, args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(failure(command, &output))
    }
}

/// Builds a failure from a finished process, preferring stderr diagnostics.
fn failure(command: &str, output: &Output) -> TerraformError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let diagnostics = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    TerraformError::Failed {
        command: command.to_string(),
        code: output.status.code(),
        diagnostics,
    }
}

impl<D: RenderedConfig> DeclarativeEngine for TerraformEngine<D> {
    type Document = D;

    fn apply(&mut self, document: &D) -> Result<(), EngineError> {
        self.prepare(document.render())?;
        let dir = self.work.path().to_path_buf();
        let applied = self.run_checked(&dir, "apply", &AUTO_APPROVE_ARGS);
        let refreshed = self.refresh_state();
        applied?;
        refreshed?;
        Ok(())
    }

    fn plan(&mut self, document: &D) -> Result<PlanSummary, EngineError> {
        self.prepare(document.render())?;
        let dir = self.work.path().to_path_buf();
        let out_arg = format!("-out={PLAN_FILE}");
        let output = self.run(
            &dir,
            "plan",
            &["-detailed-exitcode", "-input=false", "-no-color", out_arg.as_str()],
        )?;
        match output.status.code() {
            Some(0) => Ok(PlanSummary::default()),
            Some(PLAN_HAS_CHANGES) => {
                let json = self.run_checked(&dir, "show", &["-json", "-no-color", PLAN_FILE])?;
                Ok(parse_plan(&json)?)
            }
            _ => Err(failure("plan", &output).into()),
        }
    }

    fn import(
        &mut self,
        document: &D,
        address: &ResourceAddress,
        import_id: &str,
    ) -> Result<TrackedResource, EngineError> {
        self.imports += 1;
        let dir = self.work.subdir(&format!("import-{}", self.imports))?;
        stage(&dir, document.render(), &self.provider, self.settings.fixtures_dir.as_deref())?;
        self.run_checked(&dir, "init", &INIT_ARGS)?;
        self.run_checked(&dir, "import", &["-input=false", "-no-color", address.as_str(), import_id])?;
        let json = self.run_checked(&dir, "show", &["-json", "-no-color"])?;
        Ok(parse_imported(&json, address)?)
    }

    fn destroy(&mut self) -> Result<(), EngineError> {
        if !self.initialized {
            self.state.clear();
            return Ok(());
        }
        let dir = self.work.path().to_path_buf();
        self.run_checked(&dir, "destroy", &AUTO_APPROVE_ARGS)?;
        self.refresh_state()?;
        Ok(())
    }

    fn state(&self) -> &TrackedState {
        &self.state
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
