//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "construct the assembly" or "write it out".

pub mod orchestrator;
pub mod plan_service;
pub mod synth_service;

pub use orchestrator::Orchestrator;
pub use plan_service::{PlanReport, PlanService, PlannedStack};
pub use synth_service::{MANIFEST_FILE, SynthService, SynthSummary};
