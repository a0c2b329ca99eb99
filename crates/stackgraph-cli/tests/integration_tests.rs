//! Integration tests for the stackgraph binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// The binary run inside `dir`, isolated from the caller's config and env.
fn stackgraph(dir: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("stackgraph");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("STACKGRAPH_PLAN")
        .env_remove("STACKGRAPH_CONFIG")
        .env_remove("NO_COLOR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn synth_writes_templates_and_manifest() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["synth", "--account", "123456789012", "--region", "eu-west-1"])
        .assert()
        .success();

    let out = temp.path().join("stackgraph.out");
    for stack in ["Ecr", "Vpc", "Cluster", "Nlb", "ProductsService", "AuditService", "InvoicesService", "Api"] {
        assert!(out.join(format!("{stack}.template.json")).is_file(), "{stack} missing");
    }

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(
        manifest["artifacts"]["Api"]["environment"],
        "aws://123456789012/eu-west-1"
    );
}

#[test]
fn synth_output_flag_and_json_summary() {
    let temp = TempDir::new().unwrap();
    let assert = stackgraph(temp.path())
        .args(["--output-format", "json", "synth", "-o", "cdk.out"])
        .assert()
        .success();

    let summary: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(summary["written"], true);
    assert_eq!(summary["stacks"].as_array().unwrap().len(), 8);
    assert_eq!(summary["stacks"][0], "Ecr");
    assert!(temp.path().join("cdk.out").join("manifest.json").is_file());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["synth", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write 9 files"));

    assert!(!temp.path().join("stackgraph.out").exists());
}

#[test]
fn force_replaces_existing_output() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path()).arg("synth").assert().success();
    let stale = temp.path().join("stackgraph.out").join("Retired.template.json");
    fs::write(&stale, "{}").unwrap();

    stackgraph(temp.path()).args(["synth", "--force"]).assert().success();

    assert!(!stale.exists());
    assert!(temp.path().join("stackgraph.out").join("manifest.json").exists());
}

#[test]
fn stack_flag_prints_a_single_template() {
    let temp = TempDir::new().unwrap();
    let assert = stackgraph(temp.path())
        .args(["synth", "--stack", "AuditService"])
        .assert()
        .success();

    let template: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(
        template["Resources"]["ProductEventsQueue"]["Type"],
        "AWS::SQS::Queue"
    );
    assert!(!temp.path().join("stackgraph.out").exists());
}

#[test]
fn tags_flow_into_the_manifest() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["synth", "--tag", "team=Beta"])
        .assert()
        .success();

    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("stackgraph.out").join("manifest.json")).unwrap(),
    )
    .unwrap();
    let tags = &manifest["artifacts"]["Vpc"]["properties"]["tags"];
    assert_eq!(tags["team"], "Beta");
}

#[test]
fn plan_lists_canonical_order() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["plan", "--format", "list"])
        .assert()
        .success()
        .stdout(
            "Ecr\nVpc\nCluster\nNlb\nProductsService\nAuditService\nInvoicesService\nApi\n",
        );
}

#[test]
fn plan_as_dot() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["plan", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph stacks {"))
        .stdout(predicate::str::contains("\"ProductsService\" -> \"AuditService\";"));
}

#[test]
fn local_plan_file_is_discovered() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("stackgraph.plan.toml"),
        "[[stack]]\nid = \"Vpc\"\nkind = \"network\"\n\n[[stack]]\nid = \"Cluster\"\nkind = \"cluster\"\ndepends_on = [\"Vpc\"]\n",
    )
    .unwrap();

    stackgraph(temp.path())
        .args(["plan", "--format", "list"])
        .assert()
        .success()
        .stdout("Vpc\nCluster\n");
}

#[test]
fn init_creates_config_and_plan() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["init", "--with-plan"])
        .assert()
        .success();

    let config = fs::read_to_string(temp.path().join("stackgraph.toml")).unwrap();
    assert!(config.contains("region = \"us-east-1\""));
    assert!(temp.path().join("stackgraph.plan.toml").is_file());

    // The written plan is picked up and resolves to the same order.
    stackgraph(temp.path())
        .args(["plan", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8,Api,gateway,Nlb"));
}

#[test]
fn init_keeps_existing_file_without_force() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("stackgraph.toml"), "# mine\n").unwrap();

    stackgraph(temp.path()).arg("init").assert().success();

    assert_eq!(
        fs::read_to_string(temp.path().join("stackgraph.toml")).unwrap(),
        "# mine\n"
    );
}

#[test]
fn config_get_reads_local_file_and_env() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("stackgraph.toml"),
        "[deployment]\nregion = \"eu-west-1\"\n",
    )
    .unwrap();

    stackgraph(temp.path())
        .args(["config", "get", "deployment.region"])
        .assert()
        .success()
        .stdout("eu-west-1\n");

    stackgraph(temp.path())
        .env("STACKGRAPH_DEPLOYMENT__REGION", "ap-southeast-2")
        .args(["config", "get", "deployment.region"])
        .assert()
        .success()
        .stdout("ap-southeast-2\n");
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    stackgraph(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stackgraph"));
}
