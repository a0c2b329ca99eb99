//! CLI error type.
//!
//! Wraps core errors and adds the failures only the CLI can have (config
//! files, unknown keys, terminal I/O).  Every variant maps to an exit code:
//!
//! | Category                    | Code |
//! |-----------------------------|------|
//! | Graph / wiring / validation |  2   |
//! | Not found                   |  3   |
//! | Configuration               |  4   |
//! | Backend / internal          |  1   |

use std::error::Error as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use stackgraph_core::domain::DomainError;
use stackgraph_core::error::{ErrorCategory, StackgraphError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configuration key `config get` does not know.
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },

    #[error("{0}")]
    Core(#[from] StackgraphError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<DomainError> for CliError {
    fn from(err: DomainError) -> Self {
        CliError::Core(err.into())
    }
}

impl CliError {
    pub fn config(message: impl Into<String>, source: anyhow::Error) -> Self {
        CliError::ConfigError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Show the effective values: stackgraph config list".into(),
                "Create a default file: stackgraph init".into(),
            ],
            Self::UnknownKey { key } => vec![
                format!("'{key}' is not a configuration key"),
                "Known keys: deployment.account, deployment.region, synth.output_dir, \
                 synth.plan, output.no_color, tags.<name>"
                    .into(),
            ],
            Self::Core(core) => core.suggestions(),
            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::UnknownKey { .. } => ErrorCategory::NotFound,
            Self::Core(core) => core.category(),
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Graph | ErrorCategory::Wiring | ErrorCategory::Validation => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Backend | ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = format!("\n{} {}\n\n", "✗".red().bold(), "Error:".red().bold());
        output.push_str(&format!("  {}\n", self.to_string().red()));
        if let Some(stack) = self.stack() {
            output.push_str(&format!("  {} {}\n", "stack:".dimmed(), stack.bold()));
        }

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!("\n  {} {}\n", "→".dimmed(), err.to_string().dimmed()));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push_str(&format!(
                "\n{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }
        output
    }

    /// Plain-text version of [`Self::format_colored`].
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = format!("\nError: {self}\n");
        if let Some(stack) = self.stack() {
            out.push_str(&format!("  stack: {stack}\n"));
        }

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }
        out
    }

    /// JSON document for `--output-format json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "category": format!("{:?}", self.category()).to_lowercase(),
            "stack": self.stack(),
            "exit_code": self.exit_code(),
            "suggestions": self.suggestions(),
        })
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::Graph | ErrorCategory::Wiring => {
                tracing::warn!(stack = self.stack(), "Graph error: {self}")
            }
            ErrorCategory::Validation => tracing::warn!("User error: {self}"),
            ErrorCategory::NotFound => tracing::warn!("Not found: {self}"),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {self}"),
            ErrorCategory::Backend | ErrorCategory::Internal => {
                tracing::error!("Internal error: {self}")
            }
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {source}");
        }
    }

    fn stack(&self) -> Option<&str> {
        match self {
            Self::Core(core) => core.stack(),
            _ => None,
        }
    }
}
