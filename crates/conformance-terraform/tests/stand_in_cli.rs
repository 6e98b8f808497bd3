// crates/conformance-terraform/tests/stand_in_cli.rs
// ============================================================================
// Module: Terraform Engine Command Tests
// Description: Drives the engine against a scripted stand-in for Terraform.
// ============================================================================
//! ## Overview
//! A small shell script plays Terraform: it logs its arguments and answers
//! `show -json` from canned documents. This pins the command sequence,
//! environment, staging, and output handling without a real provider.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use apigw_authorizer::NameSeeds;
use apigw_authorizer::Scenario;
use apigw_authorizer::authorizer_address;
use apigw_authorizer::generate;
use conformance_core::DeclarativeEngine;
use conformance_core::EngineError;
use conformance_core::PlanAction;
use conformance_terraform::TerraformEngine;
use conformance_terraform::TerraformSettings;

const WORKING_CLI: &str = r#"#!/bin/sh
here=$(dirname "$0")
echo "$* cache=$TF_PLUGIN_CACHE_DIR auto=$TF_IN_AUTOMATION" >> "$here/calls.log"
case "$1" in
  init) exit 0 ;;
  apply) touch applied; exit 0 ;;
  plan) if [ -f "$here/plan.json" ]; then exit 2; fi; exit 0 ;;
  show)
    if [ "$4" = "conformance.tfplan" ]; then cat "$here/plan.json"; exit 0; fi
    if [ -f applied ]; then cat "$here/state.json"; else echo '{"format_version":"1.0"}'; fi
    exit 0 ;;
  import) touch applied; exit 0 ;;
  destroy) rm -f applied; exit 0 ;;
esac
echo "unexpected command $1" >&2
exit 1
"#;

const REJECTING_CLI: &str = r#"#!/bin/sh
case "$1" in
  init) exit 0 ;;
  apply)
    echo "Error: authorizer_uri must be set non-empty when authorizer type is TOKEN" >&2
    exit 1 ;;
  show) echo '{"format_version":"1.0"}'; exit 0 ;;
esac
exit 1
"#;

const STATE_JSON: &str = r#"{
  "values": {
    "root_module": {
      "resources": [
        {
          "address": "aws_api_gateway_rest_api.acctest",
          "mode": "managed",
          "values": { "id": "restapi9" }
        },
        {
          "address": "aws_api_gateway_authorizer.acctest",
          "mode": "managed",
          "values": {
            "id": "abc123",
            "rest_api_id": "restapi9",
            "type": "TOKEN",
            "authorizer_result_ttl_in_seconds": 300
          }
        }
      ]
    }
  }
}"#;

/// Serializes tests so no child is forked while a script is open for writing.
fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn install_cli(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("terraform");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(dir.join("state.json"), STATE_JSON).unwrap();
    path
}

fn settings(binary: PathBuf, root: &Path) -> TerraformSettings {
    TerraformSettings {
        binary,
        work_root: Some(root.join("work")),
        fixtures_dir: Some(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../apigw-authorizer/test-fixtures"),
        ),
        plugin_cache_dir: Some(root.join("plugin-cache")),
        keep_work_dirs: false,
        region: Some("us-west-2".to_string()),
        profile: None,
        endpoint: None,
    }
}

#[test]
fn lifecycle_commands_run_in_order_and_reload_state() {
    let _serial = serial();
    let bin = tempfile::tempdir().unwrap();
    let cli = install_cli(bin.path(), WORKING_CLI);
    let document = generate(Scenario::Lambda, &NameSeeds::fixed("1"));
    let mut engine = TerraformEngine::new(settings(cli, bin.path())).unwrap();

    engine.apply(&document).unwrap();
    let address = authorizer_address();
    let tracked = engine.state().get(&address).unwrap();
    assert_eq!(tracked.id, "abc123");
    assert_eq!(tracked.attribute("rest_api_id"), Some("restapi9"));
    let work = engine.work_dir().to_path_buf();
    assert!(work.join("main.tf").is_file());
    assert!(fs::read_to_string(work.join("provider.tf")).unwrap().contains("us-west-2"));
    assert!(work.join("test-fixtures").join("lambdatest.zip").is_file());

    assert!(engine.plan(&document).unwrap().is_empty());

    fs::write(
        bin.path().join("plan.json"),
        r#"{"resource_changes":[{"address":"aws_api_gateway_authorizer.acctest","change":{"actions":["update"]}}]}"#,
    )
    .unwrap();
    let plan = engine.plan(&document).unwrap();
    assert_eq!(plan.action_for(&address), Some(PlanAction::Update));

    let imported = engine.import(&document, &address, "restapi9/abc123").unwrap();
    assert_eq!(imported.id, "abc123");
    assert!(work.join("import-1").join("main.tf").is_file());

    engine.destroy().unwrap();
    assert!(engine.state().is_empty());

    let log = fs::read_to_string(bin.path().join("calls.log")).unwrap();
    let commands: Vec<&str> =
        log.lines().map(|line| line.split_whitespace().next().unwrap_or_default()).collect();
    assert_eq!(
        commands,
        [
            "init", "apply", "show", "plan", "plan", "show", "init", "import", "show", "destroy",
            "show"
        ]
    );
    assert!(log.contains("apply -auto-approve -input=false -no-color"));
    assert!(log.contains("import -input=false -no-color aws_api_gateway_authorizer.acctest restapi9/abc123"));
    assert!(log.contains("auto=1"));
    assert!(log.contains("plugin-cache"));
}

#[test]
fn rejected_apply_keeps_diagnostics_and_reloads_state() {
    let _serial = serial();
    let bin = tempfile::tempdir().unwrap();
    let cli = install_cli(bin.path(), REJECTING_CLI);
    let document = generate(Scenario::InvalidDefaultToken, &NameSeeds::fixed("2"));
    let mut engine = TerraformEngine::new(settings(cli, bin.path())).unwrap();

    let err = engine.apply(&document).unwrap_err();
    let EngineError::Rejected(message) = err else {
        panic!("expected a rejection");
    };
    assert!(message.starts_with("Error: authorizer_uri must be set"));
    assert!(engine.state().is_empty());
}
