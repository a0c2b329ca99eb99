//! End-to-end synthesis through the real adapters.

use std::path::Path;

use serde_json::Value;
use stackgraph_adapters::{
    BuiltinPlanSource, CloudFormationSynthesizer, LocalFilesystem, MemoryFilesystem,
};
use stackgraph_core::{
    application::{ApplicationError, MANIFEST_FILE, PlanService},
    prelude::*,
};
use tempfile::TempDir;

fn canonical_assembly() -> Assembly {
    let plan = PlanService::new(Box::new(BuiltinPlanSource::new()))
        .load()
        .unwrap();
    Orchestrator::new()
        .construct(&plan, &DeploymentSettings::default())
        .unwrap()
}

#[test]
fn synth_writes_templates_and_manifest_to_disk() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("stackgraph.out");
    let service = SynthService::new(
        Box::new(CloudFormationSynthesizer::new()),
        Box::new(LocalFilesystem::new()),
    );

    let summary = service.synthesize(&canonical_assembly(), &out, false).unwrap();

    assert_eq!(summary.files.len(), 9);
    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["artifacts"].as_object().unwrap().len(), 8);

    let audit: Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("AuditService.template.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        audit["Resources"]["ProductEventsQueue"]["Type"],
        "AWS::SQS::Queue"
    );
}

#[test]
fn second_synth_needs_overwrite() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("stackgraph.out");
    let service = SynthService::new(
        Box::new(CloudFormationSynthesizer::new()),
        Box::new(LocalFilesystem::new()),
    );
    let assembly = canonical_assembly();

    service.synthesize(&assembly, &out, false).unwrap();
    let err = service.synthesize(&assembly, &out, false).unwrap_err();
    assert!(matches!(
        err,
        StackgraphError::Application(ApplicationError::OutputExists { .. })
    ));

    assert!(service.synthesize(&assembly, &out, true).is_ok());
}

#[test]
fn overwrite_keeps_a_directory_that_synth_did_not_write() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    std::fs::create_dir_all(project.join("src")).unwrap();
    std::fs::write(project.join("src").join("main.rs"), "fn main() {}\n").unwrap();
    let service = SynthService::new(
        Box::new(CloudFormationSynthesizer::new()),
        Box::new(LocalFilesystem::new()),
    );

    let err = service
        .synthesize(&canonical_assembly(), &project, true)
        .unwrap_err();

    assert!(matches!(
        err,
        StackgraphError::Application(ApplicationError::ForeignOutput { ref entry, .. })
            if entry == "src"
    ));
    assert_eq!(
        std::fs::read_to_string(project.join("src").join("main.rs")).unwrap(),
        "fn main() {}\n"
    );
    assert!(!project.join(MANIFEST_FILE).exists());
}

#[test]
fn failed_write_leaves_no_partial_output() {
    let filesystem = MemoryFilesystem::new();
    filesystem.fail_writes_to("out/Api.template.json");
    let service = SynthService::new(
        Box::new(CloudFormationSynthesizer::new()),
        Box::new(filesystem.clone()),
    );

    let err = service
        .synthesize(&canonical_assembly(), "out", false)
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Backend);
    assert!(filesystem.list_files().is_empty());
    assert!(!filesystem.exists(Path::new("out")));
}
