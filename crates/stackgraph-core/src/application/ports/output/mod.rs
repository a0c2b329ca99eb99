//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stackgraph-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{Assembly, ConstructionPlan, StackDefinition, StackId};
use crate::error::StackgraphResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stackgraph_adapters::filesystem::LocalFilesystem` (production)
/// - `stackgraph_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StackgraphResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> StackgraphResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Direct children of a directory, sorted.
    fn list_dir(&self, path: &Path) -> StackgraphResult<Vec<PathBuf>>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StackgraphResult<()>;
}

/// Suffix of every template file in an assembly directory.
pub const TEMPLATE_SUFFIX: &str = ".template.json";

/// One stack rendered for the provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedTemplate {
    pub stack: StackId,
    pub body: String,
}

impl SynthesizedTemplate {
    /// File name of the template inside the assembly directory.
    pub fn file_name(&self) -> String {
        format!("{}{TEMPLATE_SUFFIX}", self.stack)
    }
}

/// Port for rendering stacks into deployable templates.
///
/// Implemented by:
/// - `stackgraph_adapters::synthesizer::CloudFormationSynthesizer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateSynthesizer: Send + Sync {
    /// Render one stack.
    fn synthesize(&self, stack: &StackDefinition) -> StackgraphResult<SynthesizedTemplate>;

    /// Render the assembly manifest describing `templates`.
    fn manifest(
        &self,
        assembly: &Assembly,
        templates: &[SynthesizedTemplate],
    ) -> StackgraphResult<String>;
}

/// Port for loading a construction plan.
///
/// Implemented by:
/// - `stackgraph_adapters::plan_source::BuiltinPlanSource` (canonical plan)
/// - `stackgraph_adapters::plan_source::FilePlanSource` (TOML file)
#[cfg_attr(test, mockall::automock)]
pub trait PlanSource: Send + Sync {
    fn load(&self) -> StackgraphResult<ConstructionPlan>;

    /// Human-readable origin of the plan, used in logs and errors.
    fn describe(&self) -> String;
}
