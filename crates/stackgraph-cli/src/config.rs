//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the [`DeploymentSettings`]
//! derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `STACKGRAPH_<SECTION>__<KEY>`, including those
//!    loaded from `.env`
//! 3. The file passed with `--config` (must exist)
//! 4. `./stackgraph.toml`
//! 5. The global config file (see [`AppConfig::config_path`])
//! 6. Built-in defaults

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use stackgraph_core::domain::{DeploymentEnvironment, DeploymentSettings, DomainError, Tags};

pub const LOCAL_CONFIG_FILE: &str = "stackgraph.toml";
const ENV_PREFIX: &str = "STACKGRAPH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub deployment: DeploymentConfig,
    /// Tags applied to every stack.
    pub tags: BTreeMap<String, String>,
    pub synth: SynthConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// 12-digit account id; unset means environment-agnostic templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            account: None,
            region: "us-east-1".into(),
        }
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("stackgraph.out"),
            plan: None,
        }
    }
}

impl AppConfig {
    /// Defaults as shipped, including the platform tags.
    pub fn builtin() -> Self {
        Self {
            tags: BTreeMap::from([
                ("team".to_string(), "Alpha".to_string()),
                ("cost".to_string(), "ECommerceInfra".to_string()),
            ]),
            ..Self::default()
        }
    }

    /// Load configuration from every layer.
    ///
    /// Missing global and local files are skipped; a missing `config_file`
    /// is an error.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::load_from(
            Self::config_path().as_deref(),
            Path::new(LOCAL_CONFIG_FILE),
            config_file.map(PathBuf::as_path),
        )
    }

    fn load_from(global: Option<&Path>, local: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Self::builtin()).context("invalid built-in defaults")?);

        if let Some(global) = global {
            builder = builder.add_source(File::from(global).format(FileFormat::Toml).required(false));
        }
        builder = builder.add_source(File::from(local).format(FileFormat::Toml).required(false));
        if let Some(explicit) = explicit {
            builder = builder.add_source(File::from(explicit).format(FileFormat::Toml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the global configuration file, if the platform has one.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "stackgraph", "stackgraph")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Deployment settings for the core, with CLI overrides applied.
    pub fn deployment_settings(
        &self,
        account: Option<&str>,
        region: Option<&str>,
        tag_overrides: &[String],
    ) -> Result<DeploymentSettings, DomainError> {
        let account = account.or(self.deployment.account.as_deref());
        let region = region.unwrap_or(&self.deployment.region);
        let environment = DeploymentEnvironment::parse(account, region)?;

        let mut tags = Tags::try_from(self.tags.clone())?;
        for pair in tag_overrides {
            let (key, value) = Tags::parse_pair(pair)?;
            tags.insert(key, value)?;
        }

        Ok(DeploymentSettings { environment, tags })
    }

    /// Value of a dotted key, as `config get` prints it.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "deployment.account" => Some(self.deployment.account.clone().unwrap_or_default()),
            "deployment.region" => Some(self.deployment.region.clone()),
            "synth.output_dir" => Some(self.synth.output_dir.display().to_string()),
            "synth.plan" => Some(
                self.synth
                    .plan
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            "output.no_color" => Some(self.output.no_color.to_string()),
            _ => key
                .strip_prefix("tags.")
                .and_then(|tag| self.tags.get(tag).cloned()),
        }
    }
}
