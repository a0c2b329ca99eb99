//! TOML plan files.
//!
//! ```toml
//! [[stack]]
//! id   = "Vpc"
//! kind = "network"
//!
//! [[stack]]
//! id         = "Cluster"
//! kind       = "cluster"
//! depends_on = ["Vpc"]
//!
//! [stack.tags]
//! cost = "ClusterInfra"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use stackgraph_core::{
    application::{ApplicationError, ports::PlanSource},
    domain::ConstructionPlan,
    error::{StackgraphError, StackgraphResult},
};

/// A plan read from a TOML file.
#[derive(Debug, Clone)]
pub struct FilePlanSource {
    path: PathBuf,
}

impl FilePlanSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse plan TOML; `source_name` is used in error messages.
    pub fn parse(source_name: &str, raw: &str) -> StackgraphResult<ConstructionPlan> {
        toml::from_str(raw).map_err(|e| failed(source_name, e.message()))
    }

    /// Serialise `plan` in the format `parse` reads.
    pub fn render(plan: &ConstructionPlan) -> StackgraphResult<String> {
        toml::to_string_pretty(plan).map_err(|e| StackgraphError::Internal {
            message: format!("failed to serialise plan: {e}"),
        })
    }
}

impl PlanSource for FilePlanSource {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> StackgraphResult<ConstructionPlan> {
        let source_name = self.describe();
        let raw = fs::read_to_string(&self.path).map_err(|e| failed(&source_name, e))?;
        let plan = Self::parse(&source_name, &raw)?;
        debug!(stacks = plan.len(), "Parsed plan file");
        Ok(plan)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn failed(source_name: &str, reason: impl ToString) -> StackgraphError {
    ApplicationError::PlanSourceFailed {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
