//! stackgraph core - hexagonal architecture implementation
//!
//! This crate provides the domain and application layers of stackgraph: a
//! typed dependency graph of the e-commerce platform stacks, constructed in
//! topological order and synthesized into CloudFormation templates.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          stackgraph-cli (CLI)           │
//! │      (Implements Driving Ports)         │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (Orchestrator, SynthService, PlanService)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, TemplateSynthesizer, Plan) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    stackgraph-adapters (Infrastructure) │
//! │ (CloudFormation, LocalFilesystem, TOML) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (Plan, Resolver, Stack kinds, Outputs) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use stackgraph_core::{
//!     application::Orchestrator,
//!     domain::{ConstructionPlan, DeploymentSettings},
//! };
//!
//! let plan = ConstructionPlan::canonical()?;
//! let assembly = Orchestrator::new().construct(&plan, &DeploymentSettings::default())?;
//! assert_eq!(assembly.len(), 8);
//! # Ok::<(), stackgraph_core::error::StackgraphError>(())
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Orchestrator, PlanReport, PlanService, SynthService, SynthSummary,
        ports::{Filesystem, PlanSource, SynthesizedTemplate, TemplateSynthesizer},
    };
    pub use crate::domain::{
        Assembly, ConstructionPlan, DeploymentEnvironment, DeploymentSettings, PlanEntry,
        StackDefinition, StackId, StackKind, Tags,
    };
    pub use crate::error::{ErrorCategory, StackgraphError, StackgraphResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
