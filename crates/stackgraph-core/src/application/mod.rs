//! Application layer for stackgraph.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (Orchestrator, SynthService, PlanService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! stack logic itself. Graph and wiring rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    MANIFEST_FILE, Orchestrator, PlanReport, PlanService, PlannedStack, SynthService,
    SynthSummary,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, PlanSource, SynthesizedTemplate, TemplateSynthesizer};

pub use error::ApplicationError;
