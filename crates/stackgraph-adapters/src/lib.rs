//! Infrastructure adapters for stackgraph.
//!
//! This crate implements the ports defined in `stackgraph-core::application::ports`.
//! It contains all serialisation and I/O.

pub mod filesystem;
pub mod plan_source;
pub mod synthesizer;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use plan_source::{BuiltinPlanSource, FilePlanSource, LOCAL_PLAN_FILE, PLAN_ENV_VAR, discover};
pub use synthesizer::CloudFormationSynthesizer;
