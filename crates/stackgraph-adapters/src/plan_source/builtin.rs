use stackgraph_core::{
    application::ports::PlanSource, domain::ConstructionPlan, error::StackgraphResult,
};

/// The canonical e-commerce plan compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPlanSource;

impl BuiltinPlanSource {
    pub fn new() -> Self {
        Self
    }
}

impl PlanSource for BuiltinPlanSource {
    fn load(&self) -> StackgraphResult<ConstructionPlan> {
        Ok(ConstructionPlan::canonical()?)
    }

    fn describe(&self) -> String {
        "built-in plan".into()
    }
}
