//! Application layer errors.
//!
//! These errors represent failures while synthesizing or writing an assembly,
//! not graph or wiring rules. Those are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A stack could not be rendered into a template.
    #[error("Synthesis of stack '{stack}' failed: {reason}")]
    SynthesisFailed { stack: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The output directory is already there and overwriting was not requested.
    #[error("Output directory already exists at {path}")]
    OutputExists { path: PathBuf },

    /// A construction plan could not be loaded.
    #[error("Failed to load plan from {source_name}: {reason}")]
    PlanSourceFailed { source_name: String, reason: String },

    /// `--force` was given for a directory that is not a previous assembly.
    #[error("Refusing to replace {path}: '{entry}' is not part of an assembly")]
    ForeignOutput { path: PathBuf, entry: String },

    /// A stack id named by the caller is not part of the assembly.
    #[error("Stack '{stack}' not found")]
    StackNotFound { stack: String },

    /// A write failed and removing the partial output failed too.
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    /// A shared adapter lock was poisoned by a panicking writer.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SynthesisFailed { stack, .. } => vec![
                format!("Inspect the resources declared by '{stack}'"),
                format!("Try: stackgraph synth --stack {stack} -vv"),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Or choose another directory with --output".into(),
            ],
            Self::PlanSourceFailed { source_name, .. } => vec![
                format!("Check the plan at {source_name}"),
                "Each [[stack]] needs an id and a kind".into(),
                "Try: stackgraph init --with-plan to write the default plan".into(),
            ],
            Self::ForeignOutput { path, entry } => vec![
                format!("{} holds {entry}, which synth did not write", path.display()),
                "Choose an empty or new directory with --output".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![
                format!("Remove the partial output by hand: {}", path.display()),
            ],
            Self::StackNotFound { .. } => vec![
                "Try: stackgraph plan to list the stacks of the plan".into(),
            ],
            Self::LockPoisoned => vec!["Try again; a previous write panicked".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SynthesisFailed { .. }
            | Self::FilesystemError { .. }
            | Self::RollbackFailed { .. } => ErrorCategory::Backend,
            Self::OutputExists { .. } | Self::ForeignOutput { .. } => ErrorCategory::Validation,
            Self::PlanSourceFailed { .. } => ErrorCategory::Configuration,
            Self::StackNotFound { .. } => ErrorCategory::NotFound,
            Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
