//! `stackgraph synth`: construct every stack and write the cloud assembly.

use std::path::PathBuf;

use serde_json::json;
use tracing::{debug, instrument};

use stackgraph_adapters::{CloudFormationSynthesizer, LocalFilesystem, discover};
use stackgraph_core::prelude::*;

use crate::{
    cli::{OutputFormat, SynthArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(dry_run = args.dry_run, force = args.force))]
pub fn execute(args: SynthArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings = config.deployment_settings(
        args.account.as_deref(),
        args.region.as_deref(),
        &args.tags,
    )?;

    let plans = PlanService::new(discover(args.plan.or(config.synth.plan).as_deref()));
    let plan = plans.load()?;
    let assembly = Orchestrator::new().construct(&plan, &settings)?;
    debug!(stacks = assembly.len(), "Assembly constructed");

    let service = SynthService::new(
        Box::new(CloudFormationSynthesizer::new()),
        Box::new(LocalFilesystem::new()),
    );

    if let Some(stack) = args.stack {
        let template = service.render_stack(&assembly, &stack)?;
        output.data(template.body.trim_end())?;
        return Ok(());
    }

    let root: PathBuf = args.output.unwrap_or(config.synth.output_dir);
    let summary = if args.dry_run {
        SynthSummary::from_layout(&service.prepare(&assembly, &root)?, false)
    } else {
        service.synthesize(&assembly, &root, args.force)?
    };

    report(&summary, &assembly, &plans.source(), &output)
}

fn report(
    summary: &SynthSummary,
    assembly: &Assembly,
    source: &str,
    output: &OutputManager,
) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        output.json(&json!({
            "output": summary.root.display().to_string(),
            "written": summary.written,
            "environment": assembly.environment().uri(),
            "plan": source,
            "stacks": assembly.order().into_iter().map(StackId::as_str).collect::<Vec<_>>(),
            "files": summary.files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>(),
            "bytes": summary.bytes,
        }))?;
        return Ok(());
    }

    let verb = if summary.written { "Wrote" } else { "Would write" };
    output.header(&format!(
        "{} stacks for {} ({source})",
        assembly.len(),
        assembly.environment().uri()
    ))?;
    for file in &summary.files {
        output.print(&format!("  {}", summary.root.join(file).display()))?;
    }
    output.success(&format!(
        "{verb} {} files ({} bytes) to {}",
        summary.files.len(),
        summary.bytes,
        summary.root.display()
    ))?;
    Ok(())
}
