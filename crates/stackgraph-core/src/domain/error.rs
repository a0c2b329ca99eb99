// ============================================================================
// domain/error.rs - GRAPH AND WIRING ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reported once, inspected by several layers)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
///
/// Every variant raised while building a stack names that stack, so a
/// failed run always points at the wiring that needs fixing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Graph Errors (detected before any stack is constructed)
    // ========================================================================
    #[error("construction plan contains no stacks")]
    EmptyPlan,

    #[error("stack '{stack}' is declared more than once")]
    DuplicateStack { stack: String },

    #[error("stack '{stack}' depends on itself")]
    SelfDependency { stack: String },

    #[error("stack '{stack}' depends on unknown stack '{dependency}'")]
    UnknownDependency { stack: String, dependency: String },

    #[error("dependency cycle between stacks: {}", stacks.join(", "))]
    DependencyCycle { stacks: Vec<String> },

    // ========================================================================
    // Configuration Errors (a stack's inputs fail local validation)
    // ========================================================================
    #[error("stack '{stack}' requires output '{output}' but none of its dependencies provide it")]
    MissingOutput { stack: String, output: String },

    #[error("stack '{stack}' found output '{output}' on several dependencies: {}", candidates.join(", "))]
    AmbiguousOutput {
        stack: String,
        output: String,
        candidates: Vec<String>,
    },

    #[error("stack '{stack}': invalid logical id '{id}': {reason}")]
    InvalidLogicalId {
        stack: String,
        id: String,
        reason: String,
    },

    #[error("stack '{stack}': logical id '{id}' is used twice")]
    DuplicateLogicalId { stack: String, id: String },

    #[error("stack '{stack}': output '{output}' is exported twice")]
    DuplicateOutput { stack: String, output: String },

    #[error("stack '{stack}': resource '{resource}' has invalid name '{name}': {reason}")]
    InvalidResourceName {
        stack: String,
        resource: String,
        name: String,
        reason: String,
    },

    #[error("stack '{stack}': {field} is out of range: {reason}")]
    OutOfRange {
        stack: String,
        field: String,
        reason: String,
    },

    #[error("stack '{stack}' declares no resources")]
    EmptyStack { stack: String },

    #[error("stack '{stack}': resource '{resource}' depends on undeclared resource '{dependency}'")]
    DanglingResourceDependency {
        stack: String,
        resource: String,
        dependency: String,
    },

    // ========================================================================
    // Validation Errors (malformed identifiers and settings)
    // ========================================================================
    #[error("invalid stack id '{id}': {reason}")]
    InvalidStackId { id: String, reason: String },

    #[error("unknown stack kind '{0}'")]
    UnknownStackKind(String),

    #[error("invalid tag '{key}': {reason}")]
    InvalidTag { key: String, reason: String },

    #[error("invalid deployment environment: {0}")]
    InvalidEnvironment(String),

    // ========================================================================
    // Artifact Errors
    // ========================================================================
    #[error("artifact layout contains no files")]
    EmptyArtifactLayout,

    #[error("artifact path '{path}' is written twice")]
    DuplicateArtifactPath { path: String },

    #[error("artifact path '{path}' must be relative to the output directory")]
    AbsoluteArtifactPath { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyPlan => vec![
                "Declare at least one [[stack]] entry in the plan file".into(),
                "Or omit --plan to use the built-in plan".into(),
            ],
            Self::UnknownDependency { dependency, .. } => vec![
                format!("Declare a stack with id '{dependency}' or remove the edge"),
                "Try: stackgraph plan to see the declared stacks".into(),
            ],
            Self::DependencyCycle { stacks } => vec![
                format!("Break one of the edges between: {}", stacks.join(", ")),
                "Outputs flow from dependency to dependent, never back".into(),
            ],
            Self::MissingOutput { stack, output } => vec![
                format!("Add the stack that exports '{output}' to the depends_on list of '{stack}'"),
                "Stacks only see outputs of the stacks they declare as dependencies".into(),
            ],
            Self::AmbiguousOutput { stack, .. } => vec![
                format!("Keep only one provider of this output in the dependencies of '{stack}'"),
            ],
            Self::UnknownStackKind(_) => vec![
                "Known kinds: registry, network, cluster, load-balancer, \
                 products-service, audit-service, invoices-service, gateway"
                    .into(),
            ],
            Self::InvalidEnvironment(_) => vec![
                "Accounts are 12 digits, regions look like 'us-east-1'".into(),
                "Set them with --account/--region or in the [deployment] config section".into(),
            ],
            _ => vec!["See the error details above".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyPlan
            | Self::DuplicateStack { .. }
            | Self::SelfDependency { .. }
            | Self::UnknownDependency { .. }
            | Self::DependencyCycle { .. } => ErrorCategory::Graph,

            Self::MissingOutput { .. }
            | Self::AmbiguousOutput { .. }
            | Self::InvalidLogicalId { .. }
            | Self::DuplicateLogicalId { .. }
            | Self::DuplicateOutput { .. }
            | Self::InvalidResourceName { .. }
            | Self::OutOfRange { .. }
            | Self::EmptyStack { .. }
            | Self::DanglingResourceDependency { .. } => ErrorCategory::Configuration,

            Self::InvalidStackId { .. }
            | Self::UnknownStackKind(_)
            | Self::InvalidTag { .. }
            | Self::InvalidEnvironment(_)
            | Self::EmptyArtifactLayout
            | Self::DuplicateArtifactPath { .. }
            | Self::AbsoluteArtifactPath { .. } => ErrorCategory::Validation,
        }
    }

    /// The stack the error is about, if it concerns a single stack.
    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::DuplicateStack { stack }
            | Self::SelfDependency { stack }
            | Self::UnknownDependency { stack, .. }
            | Self::MissingOutput { stack, .. }
            | Self::AmbiguousOutput { stack, .. }
            | Self::InvalidLogicalId { stack, .. }
            | Self::DuplicateLogicalId { stack, .. }
            | Self::DuplicateOutput { stack, .. }
            | Self::InvalidResourceName { stack, .. }
            | Self::OutOfRange { stack, .. }
            | Self::EmptyStack { stack }
            | Self::DanglingResourceDependency { stack, .. } => Some(stack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Graph,
    Configuration,
    Validation,
}
