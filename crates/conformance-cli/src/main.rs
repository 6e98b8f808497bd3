// crates/conformance-cli/src/main.rs
// ============================================================================
// Module: Authorizer Conformance CLI Entry Point
// Description: Command dispatcher for listing, rendering, and running suites.
// Purpose: Run authorizer conformance cases against simulated or live backends.
// Dependencies: clap, apigw-authorizer, conformance-*, serde, thiserror
// ============================================================================

//! ## Overview
//! `authorizer-conformance` lists the case catalog, renders scenario
//! documents for inspection, validates configuration, and runs cases. The
//! simulated backend needs no credentials. The live backend drives
//! Terraform against a real account and refuses to start unless the
//! acceptance gate is set.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use apigw_authorizer::AuthorizerConfig;
use apigw_authorizer::NameSeeds;
use apigw_authorizer::Scenario;
use apigw_authorizer::SimFaults;
use apigw_authorizer::SimulatedCloud;
use apigw_authorizer::SuiteName;
use apigw_authorizer::build_all;
use apigw_authorizer::config::DEFAULT_NAME_ROOT;
use apigw_authorizer::generate;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use conformance_aws::ApiGatewayAuthorizerClient;
use conformance_config::ConformanceConfig;
use conformance_config::ConformanceEnv;
use conformance_config::EventSinkKind;
use conformance_config::MAX_PARALLELISM;
use conformance_config::acceptance_enabled;
use conformance_core::CaseReport;
use conformance_core::FileEventSink;
use conformance_core::HarnessError;
use conformance_core::HarnessEventSink;
use conformance_core::LifecycleVerifier;
use conformance_core::NoopEventSink;
use conformance_core::StderrEventSink;
use conformance_core::SuiteReport;
use conformance_core::SuiteRunner;
use conformance_core::TestCase;
use conformance_core::VerifierContext;
use conformance_core::VerifierOptions;
use conformance_terraform::TerraformEngine;
use conformance_terraform::TerraformSettings;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "authorizer-conformance", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the conformance cases.
    List(ListCommand),
    /// Print the document generated for one scenario.
    Render(RenderCommand),
    /// Run conformance cases.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
struct RenderCommand {
    /// Scenario to render.
    #[arg(long, value_parser = parse_scenario)]
    scenario: Scenario,
    /// Suffix for the deterministic preview names.
    #[arg(long, value_name = "SUFFIX", default_value = "preview")]
    seed: String,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Case to run; repeat for several. Runs every case when omitted.
    #[arg(long = "suite", value_name = "NAME", value_parser = parse_suite)]
    suites: Vec<SuiteName>,
    /// Backend the cases run against.
    #[arg(long, value_enum, default_value_t = Backend::Simulated)]
    backend: Backend,
    /// Config file path (defaults to authorizer-conformance.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format for case reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Maximum number of cases in flight (overrides config).
    #[arg(long, value_name = "N")]
    parallelism: Option<usize>,
    /// Fault to inject into the simulated backend; repeatable.
    #[arg(long = "fault", value_enum, value_name = "FAULT")]
    faults: Vec<FaultArg>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to authorizer-conformance.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Case backends.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum Backend {
    /// In-process simulated engine and service.
    Simulated,
    /// Terraform plus the live API Gateway service.
    Live,
}

/// Simulated backend faults.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum FaultArg {
    /// The service stores a TTL of 0 as unset.
    TtlZeroAsUnset,
    /// Import drops the identity validation expression.
    ImportDropsValidationExpression,
    /// Authorizer updates replace the object.
    ReplaceOnUpdate,
    /// Destroy leaves authorizers behind.
    LeakOnDestroy,
    /// Reads fail after destroy.
    ReadErrorAfterDestroy,
    /// Invalid declarations are accepted.
    SkipValidation,
    /// Plans ignore out-of-band deletion.
    IgnoreDrift,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("authorizer-conformance {version}"))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::List(command) => command_list(&command),
        Commands::Render(command) => command_render(&command),
        Commands::Run(command) => command_run(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("")
}

// ============================================================================
// SECTION: Argument Parsers
// ============================================================================

/// Parses a case name.
fn parse_suite(raw: &str) -> Result<SuiteName, String> {
    SuiteName::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = SuiteName::ALL.iter().map(|suite| suite.as_str()).collect();
        format!("unknown suite {raw}; expected one of {}", known.join(", "))
    })
}

/// Parses a scenario label.
fn parse_scenario(raw: &str) -> Result<Scenario, String> {
    Scenario::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Scenario::ALL.iter().map(|scenario| scenario.as_str()).collect();
        format!("unknown scenario {raw}; expected one of {}", known.join(", "))
    })
}

// ============================================================================
// SECTION: List and Render Commands
// ============================================================================

/// One catalog entry in JSON output.
#[derive(Debug, Serialize)]
struct SuiteListing {
    /// Case name.
    suite: &'static str,
    /// One-line description.
    description: &'static str,
}

/// Executes `list`.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    for suite in SuiteName::ALL {
        let line = match command.format {
            OutputFormat::Text => format!("{:<24}{}", suite.as_str(), suite.description()),
            OutputFormat::Json => to_json_line(&SuiteListing {
                suite: suite.as_str(),
                description: suite.description(),
            })?,
        };
        write_stdout_line(&line)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `render`.
fn command_render(command: &RenderCommand) -> CliResult<ExitCode> {
    let document = generate(command.scenario, &NameSeeds::fixed(&command.seed));
    write_stdout_line(document.text().trim_end())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    load_config(command.config.as_ref())?;
    write_stdout_line("config valid")?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration with a CLI-facing error.
fn load_config(path: Option<&PathBuf>) -> CliResult<ConformanceConfig> {
    ConformanceConfig::load(path.map(PathBuf::as_path))
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes `run`.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_ref())?;
    let parallelism = resolve_parallelism(command.parallelism, &config)?;
    let suites = select_suites(&command.suites);
    let root = config.harness.name_prefix.clone().unwrap_or_else(|| DEFAULT_NAME_ROOT.to_string());
    let cases = build_all(&suites, || NameSeeds::random_with_root(&root))
        .map_err(|err| CliError::new(format!("failed to build cases: {err}")))?;
    let events = build_event_sink(&config)?;
    let options = VerifierOptions {
        destroy_check: config.harness.destroy_check,
    };

    let report = match command.backend {
        Backend::Simulated => {
            run_simulated(&cases, parallelism, faults_from_args(&command.faults), &events, options)
        }
        Backend::Live => {
            if !command.faults.is_empty() {
                return Err(CliError::new("--fault applies only to the simulated backend".to_string()));
            }
            ensure_acceptance_gate()?;
            run_live(&cases, parallelism, &config, &events, options)?
        }
    };

    emit_report(&report, command.format)?;
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Resolves parallelism from the flag or configuration.
fn resolve_parallelism(flag: Option<usize>, config: &ConformanceConfig) -> CliResult<usize> {
    let value = flag.unwrap_or(config.harness.parallelism);
    if value == 0 || value > MAX_PARALLELISM {
        return Err(CliError::new(format!(
            "parallelism must be between 1 and {MAX_PARALLELISM}, got {value}"
        )));
    }
    Ok(value)
}

/// Returns the requested cases in first-mention order, or every case.
fn select_suites(requested: &[SuiteName]) -> Vec<SuiteName> {
    if requested.is_empty() {
        return SuiteName::ALL.to_vec();
    }
    let mut out: Vec<SuiteName> = Vec::with_capacity(requested.len());
    for suite in requested {
        if !out.contains(suite) {
            out.push(*suite);
        }
    }
    out
}

/// Builds the configured event sink.
fn build_event_sink(config: &ConformanceConfig) -> CliResult<Arc<dyn HarnessEventSink>> {
    match config.events.sink {
        EventSinkKind::Stderr => Ok(Arc::new(StderrEventSink)),
        EventSinkKind::None => Ok(Arc::new(NoopEventSink)),
        EventSinkKind::File => {
            let path = config.events.path.as_deref().ok_or_else(|| {
                CliError::new("events.path is required for the file sink".to_string())
            })?;
            let sink = FileEventSink::new(path).map_err(|err| {
                CliError::new(format!("failed to open event log {}: {err}", path.display()))
            })?;
            Ok(Arc::new(sink))
        }
    }
}

/// Maps fault flags onto simulated backend faults.
fn faults_from_args(args: &[FaultArg]) -> SimFaults {
    let mut faults = SimFaults::default();
    for arg in args {
        match arg {
            FaultArg::TtlZeroAsUnset => faults.ttl_zero_as_unset = true,
            FaultArg::ImportDropsValidationExpression => {
                faults.import_drops_validation_expression = true;
            }
            FaultArg::ReplaceOnUpdate => faults.replace_on_update = true,
            FaultArg::LeakOnDestroy => faults.leak_on_destroy = true,
            FaultArg::ReadErrorAfterDestroy => faults.read_error_after_destroy = true,
            FaultArg::SkipValidation => faults.skip_validation = true,
            FaultArg::IgnoreDrift => faults.ignore_drift = true,
        }
    }
    faults
}

/// Runs cases against one shared simulated cloud.
fn run_simulated(
    cases: &[TestCase<AuthorizerConfig>],
    parallelism: usize,
    faults: SimFaults,
    events: &Arc<dyn HarnessEventSink>,
    options: VerifierOptions,
) -> SuiteReport {
    let cloud = SimulatedCloud::with_faults(faults);
    SuiteRunner::new(parallelism).run(cases, |_| {
        let ctx = VerifierContext::new(cloud.engine(), cloud.remote(), Arc::clone(events))
            .with_options(options);
        Ok(LifecycleVerifier::new(ctx))
    })
}

/// Refuses live runs unless the acceptance gate is set.
fn ensure_acceptance_gate() -> CliResult<()> {
    let enabled = acceptance_enabled().map_err(|err| CliError::new(err.to_string()))?;
    if enabled {
        return Ok(());
    }
    Err(CliError::new(format!(
        "live runs create real resources; set {}=1 to enable them",
        ConformanceEnv::Acceptance.as_str()
    )))
}

/// Runs cases through Terraform against the live service.
fn run_live(
    cases: &[TestCase<AuthorizerConfig>],
    parallelism: usize,
    config: &ConformanceConfig,
    events: &Arc<dyn HarnessEventSink>,
    options: VerifierOptions,
) -> CliResult<SuiteReport> {
    let remote = ApiGatewayAuthorizerClient::new(&config.aws)
        .map_err(|err| CliError::new(format!("failed to build API Gateway client: {err}")))?;
    let settings = TerraformSettings::from_config(config);
    Ok(SuiteRunner::new(parallelism).run(cases, |_| {
        let engine = TerraformEngine::<AuthorizerConfig>::new(settings.clone())
            .map_err(|err| HarnessError::Engine(err.into()))?;
        let ctx =
            VerifierContext::new(engine, remote.clone(), Arc::clone(events)).with_options(options);
        Ok(LifecycleVerifier::new(ctx))
    }))
}

// ============================================================================
// SECTION: Report Output
// ============================================================================

/// Pass/fail totals in JSON output.
#[derive(Debug, Serialize)]
struct SummaryLine {
    /// Passed case count.
    passed: usize,
    /// Failed case count.
    failed: usize,
}

/// Writes every case report followed by a summary.
fn emit_report(report: &SuiteReport, format: OutputFormat) -> CliResult<()> {
    for case in &report.cases {
        match format {
            OutputFormat::Text => {
                for line in render_case_text(case) {
                    write_stdout_line(&line)?;
                }
            }
            OutputFormat::Json => write_stdout_line(&to_json_line(case)?)?,
        }
    }
    let summary = match format {
        OutputFormat::Text => render_summary_text(report),
        OutputFormat::Json => to_json_line(&SummaryLine {
            passed: report.passed(),
            failed: report.failed(),
        })?,
    };
    write_stdout_line(&summary)
}

/// Renders one case as text lines.
fn render_case_text(case: &CaseReport) -> Vec<String> {
    let verdict = if case.passed() { "PASS" } else { "FAIL" };
    let mut lines = vec![format!("{verdict} {} ({} ms)", case.case, case.duration_ms)];
    if let Some(failure) = &case.failure {
        let location =
            failure.step.map_or_else(|| "teardown".to_string(), |step| format!("step {step}"));
        lines.push(format!("  {location} [{}]: {}", failure.kind, failure.message));
    }
    for note in &case.cleanup_notes {
        lines.push(format!("  cleanup: {note}"));
    }
    lines
}

/// Renders the pass/fail totals.
fn render_summary_text(report: &SuiteReport) -> String {
    format!("{} passed, {} failed", report.passed(), report.failed())
}

/// Serializes one value as a JSON line.
fn to_json_line<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
