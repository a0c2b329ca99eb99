//! Unified error handling for stackgraph core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for stackgraph core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StackgraphError {
    /// Graph, wiring and validation failures from the domain layer.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (synthesis, filesystem, plan loading).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StackgraphError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in stackgraph".into()],
        }
    }

    /// Get error category for display and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Graph => ErrorCategory::Graph,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Wiring,
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Id of the stack the error is about, when there is one.
    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Domain(e) => e.stack(),
            Self::Application(
                ApplicationError::SynthesisFailed { stack, .. }
                | ApplicationError::StackNotFound { stack },
            ) => Some(stack),
            _ => None,
        }
    }
}

/// Error categories for UI display and exit codes.
///
/// `Wiring` is a stack rejecting its inputs; `Configuration` is invalid
/// tool settings or plan files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Graph,
    Wiring,
    Configuration,
    Validation,
    NotFound,
    Backend,
    Internal,
}

/// Convenient result type alias.
pub type StackgraphResult<T> = Result<T, StackgraphError>;
