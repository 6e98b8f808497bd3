// crates/conformance-terraform/src/show.rs
// ============================================================================
// Module: Terraform JSON Output
// Description: Parsers for `terraform show -json` state and plan documents.
// Purpose: Turn Terraform's machine-readable output into harness types.
// Dependencies: conformance-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Terraform's JSON output format nests managed resources under
//! `values.root_module`, with child modules recursing the same shape, and
//! lists planned changes under `resource_changes` as action arrays.
//!
//! # Invariants
//! - Data sources never enter tracked state.
//! - `no-op` and `read` actions never enter a plan summary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::PlanAction;
use conformance_core::PlanSummary;
use conformance_core::PlannedChange;
use conformance_core::ResourceAddress;
use conformance_core::TrackedResource;
use conformance_core::TrackedState;
use conformance_core::flatten_attributes;
use serde::Deserialize;
use serde_json::Value;

use crate::error::TerraformError;

// ============================================================================
// SECTION: State Document
// ============================================================================

/// Top level of `terraform show -json` for state.
#[derive(Debug, Deserialize)]
struct StateDocument {
    /// Absent when nothing has been applied.
    #[serde(default)]
    values: Option<StateValues>,
}

/// State values section.
#[derive(Debug, Deserialize)]
struct StateValues {
    /// Root module resources.
    #[serde(default)]
    root_module: Option<ModuleValues>,
}

/// One module's resources.
#[derive(Debug, Default, Deserialize)]
struct ModuleValues {
    /// Resources declared directly in the module.
    #[serde(default)]
    resources: Vec<ResourceValues>,
    /// Nested module calls.
    #[serde(default)]
    child_modules: Vec<ModuleValues>,
}

/// One resource instance.
#[derive(Debug, Deserialize)]
struct ResourceValues {
    /// Full address, e.g. `aws_api_gateway_authorizer.acctest`.
    address: String,
    /// `managed` or `data`.
    mode: String,
    /// Resource type. Child-module addresses carry a `module.` prefix, so
    /// the type cannot be read off the address.
    #[serde(rename = "type", default)]
    resource_type: Option<String>,
    /// Attribute values as the provider recorded them.
    #[serde(default)]
    values: Value,
}

/// Parses state JSON into tracked state.
///
/// # Errors
///
/// Returns [`TerraformError::Json`] when the document is malformed.
pub fn parse_state(json: &str) -> Result<TrackedState, TerraformError> {
    let document: StateDocument =
        serde_json::from_str(json).map_err(|err| TerraformError::Json(err.to_string()))?;
    let mut state = TrackedState::new();
    if let Some(root) = document.values.and_then(|values| values.root_module) {
        collect_module(root, &mut state);
    }
    Ok(state)
}

/// Parses state JSON and returns the resource at `address`.
///
/// # Errors
///
/// Returns [`TerraformError::Json`] when the document is malformed or the
/// resource is missing.
pub fn parse_imported(json: &str, address: &ResourceAddress) -> Result<TrackedResource, TerraformError> {
    let mut state = parse_state(json)?;
    state.remove(address).ok_or_else(|| {
        TerraformError::Json(format!("imported state does not contain {address}"))
    })
}

/// Moves managed resources from `module` and its children into `state`.
fn collect_module(module: ModuleValues, state: &mut TrackedState) {
    for resource in module.resources {
        if resource.mode != "managed" {
            continue;
        }
        let id = resource.values.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let mut tracked = TrackedResource::new(ResourceAddress::new(resource.address), id)
            .with_attributes(flatten_attributes(&resource.values));
        if let Some(resource_type) = resource.resource_type.filter(|kind| !kind.is_empty()) {
            tracked.resource_type = resource_type;
        }
        state.insert(tracked);
    }
    for child in module.child_modules {
        collect_module(child, state);
    }
}

// ============================================================================
// SECTION: Plan Document
// ============================================================================

/// Top level of `terraform show -json` for a saved plan.
#[derive(Debug, Deserialize)]
struct PlanDocument {
    /// Per-resource changes.
    #[serde(default)]
    resource_changes: Vec<ResourceChange>,
}

/// One resource change.
#[derive(Debug, Deserialize)]
struct ResourceChange {
    /// Full address.
    address: String,
    /// Change body.
    change: ChangeBody,
}

/// Actions planned for a resource.
#[derive(Debug, Deserialize)]
struct ChangeBody {
    /// Ordered action labels.
    actions: Vec<String>,
}

/// Parses saved-plan JSON into a plan summary.
///
/// # Errors
///
/// Returns [`TerraformError::Json`] when the document is malformed or an
/// action combination is unknown.
pub fn parse_plan(json: &str) -> Result<PlanSummary, TerraformError> {
    let document: PlanDocument =
        serde_json::from_str(json).map_err(|err| TerraformError::Json(err.to_string()))?;
    let mut summary = PlanSummary::default();
    for change in document.resource_changes {
        if let Some(action) = plan_action(&change.address, &change.change.actions)? {
            summary.changes.push(PlannedChange {
                address: ResourceAddress::new(change.address),
                action,
            });
        }
    }
    Ok(summary)
}

/// Maps a Terraform action list to a plan action; no-ops map to `None`.
fn plan_action(address: &str, actions: &[String]) -> Result<Option<PlanAction>, TerraformError> {
    let labels: Vec<&str> = actions.iter().map(String::as_str).collect();
    match labels.as_slice() {
        [] | ["no-op"] | ["read"] => Ok(None),
        ["create"] => Ok(Some(PlanAction::Create)),
        ["update"] => Ok(Some(PlanAction::Update)),
        ["delete"] => Ok(Some(PlanAction::Delete)),
        ["delete", "create"] | ["create", "delete"] => Ok(Some(PlanAction::Replace)),
        other => Err(TerraformError::Json(format!(
            "unknown action list [{}] for {address}",
            other.join(", ")
        ))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
