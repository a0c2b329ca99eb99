//! `stackgraph init`: write a default configuration file, and optionally
//! the built-in construction plan as an editable TOML file.

use std::path::{Path, PathBuf};

use stackgraph_adapters::{FilePlanSource, LOCAL_PLAN_FILE};
use stackgraph_core::domain::ConstructionPlan;

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    output.info("Initialising configuration...")?;

    let config_path = if args.global {
        AppConfig::config_path().ok_or_else(|| CliError::ConfigError {
            message: "no configuration directory on this platform".into(),
            source: None,
        })?
    } else {
        PathBuf::from(LOCAL_CONFIG_FILE)
    };

    let config = toml::to_string_pretty(&AppConfig::builtin()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;
    write_unless_present(&config_path, &config, args.force, &output)?;

    if args.with_plan {
        let plan = FilePlanSource::render(&ConstructionPlan::canonical()?)?;
        write_unless_present(Path::new(LOCAL_PLAN_FILE), &plan, args.force, &output)?;
    }

    Ok(())
}

/// Write `content` to `path`; an existing file is kept unless `force`.
fn write_unless_present(
    path: &Path,
    content: &str,
    force: bool,
    output: &OutputManager,
) -> CliResult<()> {
    if path.exists() && !force {
        output.warning(&format!(
            "{} already exists (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
            message: format!("Failed to create directory '{}'", parent.display()),
            source: e,
        })?;
    }

    std::fs::write(path, content).map_err(|e| CliError::IoError {
        message: format!("Failed to write '{}'", path.display()),
        source: e,
    })?;

    output.success(&format!("Created {}", path.display()))?;
    Ok(())
}
