//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stackgraph",
    bin_name = "stackgraph",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Typed stack graph and CloudFormation synthesizer for the e-commerce platform",
    long_about = "stackgraph builds the registry, network, cluster, load balancer, \
                  service and gateway stacks in dependency order and writes one \
                  CloudFormation template per stack plus a manifest.",
    after_help = "EXAMPLES:\n\
        \x20 stackgraph synth --account 123456789012 --region eu-west-1\n\
        \x20 stackgraph synth --stack Api\n\
        \x20 stackgraph plan --format dot | dot -Tsvg > stacks.svg\n\
        \x20 stackgraph completions bash > /usr/share/bash-completion/completions/stackgraph",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Construct every stack and write the cloud assembly.
    #[command(
        visible_alias = "s",
        about = "Synthesize the cloud assembly",
        after_help = "EXAMPLES:\n\
            \x20 stackgraph synth\n\
            \x20 stackgraph synth --output cdk.out --force\n\
            \x20 stackgraph synth --tag team=Beta --tag cost=Shop\n\
            \x20 stackgraph synth --stack ProductsService > products.json"
    )]
    Synth(SynthArgs),

    /// Show the resolved construction order.
    #[command(
        visible_alias = "p",
        about = "Show the construction order",
        after_help = "EXAMPLES:\n\
            \x20 stackgraph plan\n\
            \x20 stackgraph plan --plan shop.plan.toml --format json"
    )]
    Plan(PlanArgs),

    /// Initialise a stackgraph configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stackgraph init               # ./stackgraph.toml\n\
            \x20 stackgraph init --global      # user config directory\n\
            \x20 stackgraph init --with-plan   # also ./stackgraph.plan.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stackgraph completions bash > ~/.local/share/bash-completion/completions/stackgraph\n\
            \x20 stackgraph completions zsh  > ~/.zfunc/_stackgraph\n\
            \x20 stackgraph completions fish > ~/.config/fish/completions/stackgraph.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the stackgraph configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stackgraph config get deployment.region\n\
            \x20 stackgraph config list\n\
            \x20 stackgraph config path"
    )]
    Config(ConfigCommands),
}

// ── synth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SynthArgs {
    /// AWS account id; omitted means environment-agnostic templates.
    #[arg(long = "account", value_name = "ID", help = "Target AWS account (12 digits)")]
    pub account: Option<String>,

    #[arg(long = "region", value_name = "REGION", help = "Target AWS region")]
    pub region: Option<String>,

    /// Extra tags applied to every stack, overriding configured ones.
    #[arg(
        short = 't',
        long = "tag",
        value_name = "KEY=VALUE",
        help = "Tag every stack (repeatable)"
    )]
    pub tags: Vec<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory (default: stackgraph.out)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "plan", value_name = "FILE", help = "Construction plan file (TOML)")]
    pub plan: Option<PathBuf>,

    /// Print the template of one stack to stdout instead of writing files.
    #[arg(long = "stack", value_name = "ID", help = "Print one stack's template")]
    pub stack: Option<String>,

    #[arg(long = "force", help = "Overwrite an existing output directory")]
    pub force: bool,

    #[arg(
        long = "dry-run",
        conflicts_with = "stack",
        help = "Show what would be written without writing"
    )]
    pub dry_run: bool,
}

// ── plan ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[arg(long = "plan", value_name = "FILE", help = "Construction plan file (TOML)")]
    pub plan: Option<PathBuf>,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: PlanFormat,
}

/// Output format for the `plan` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Human-readable table.
    Table,
    /// One stack id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
    /// Graphviz digraph.
    Dot,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the global config location instead of `./stackgraph.toml`.
    #[arg(long = "global", help = "Create global configuration")]
    pub global: bool,

    /// Also write the built-in plan to `./stackgraph.plan.toml`.
    #[arg(long = "with-plan", help = "Write the default construction plan")]
    pub with_plan: bool,

    #[arg(short = 'f', long = "force", help = "Overwrite existing files")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `deployment.region` or `tags.team`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_synth_command() {
        let cli = Cli::parse_from([
            "stackgraph",
            "synth",
            "--account",
            "123456789012",
            "--tag",
            "team=Beta",
            "-t",
            "cost=Shop",
            "--force",
        ]);
        let Commands::Synth(args) = cli.command else {
            panic!("expected Synth command");
        };
        assert_eq!(args.account.as_deref(), Some("123456789012"));
        assert_eq!(args.tags, ["team=Beta", "cost=Shop"]);
        assert!(args.force);
        assert!(!args.dry_run);
    }

    #[test]
    fn plan_format_defaults_to_table() {
        let cli = Cli::parse_from(["stackgraph", "plan"]);
        let Commands::Plan(args) = cli.command else {
            panic!("expected Plan command");
        };
        assert_eq!(args.format, PlanFormat::Table);
    }

    #[test]
    fn dry_run_conflicts_with_stack() {
        let result =
            Cli::try_parse_from(["stackgraph", "synth", "--dry-run", "--stack", "Api"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stackgraph", "--quiet", "--verbose", "plan"]);
        assert!(result.is_err());
    }
}
