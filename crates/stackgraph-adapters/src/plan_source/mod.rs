//! Construction plan sources.
//!
//! # Discovery order
//!
//! 1. An explicit path (`--plan` or `synth.plan` in the config)
//! 2. `$STACKGRAPH_PLAN`
//! 3. `./stackgraph.plan.toml`
//! 4. The built-in e-commerce plan

mod builtin;
mod file;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use stackgraph_core::application::ports::PlanSource;

pub use builtin::BuiltinPlanSource;
pub use file::FilePlanSource;

pub const PLAN_ENV_VAR: &str = "STACKGRAPH_PLAN";
pub const LOCAL_PLAN_FILE: &str = "stackgraph.plan.toml";

/// Pick the plan source for this run.
///
/// An explicit or environment-provided path is used even if it does not
/// exist, so that a typo surfaces as an error instead of silently falling
/// back to the built-in plan.
pub fn discover(explicit: Option<&Path>) -> Box<dyn PlanSource> {
    match plan_path(
        explicit,
        std::env::var_os(PLAN_ENV_VAR),
        Path::new(LOCAL_PLAN_FILE),
    ) {
        Some(path) => {
            debug!(path = %path.display(), "Using plan file");
            Box::new(FilePlanSource::new(path))
        }
        None => {
            debug!("Using built-in plan");
            Box::new(BuiltinPlanSource::new())
        }
    }
}

fn plan_path(explicit: Option<&Path>, env: Option<OsString>, local: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    local.is_file().then(|| local.to_path_buf())
}
