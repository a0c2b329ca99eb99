//! Orchestrator - builds every stack of a plan in dependency order.

use tracing::{debug, info, instrument};

use crate::{
    domain::{
        Assembly, ConstructionPlan, DependencyResolver, DeploymentSettings, OutputRegistry, stacks,
    },
    error::StackgraphResult,
};

/// Turns a construction plan into an assembly.
///
/// The graph is resolved before anything is built, so graph errors never
/// leave a half-constructed assembly behind. Each stack sees only the
/// outputs of the stacks it declares as dependencies.
#[derive(Debug, Default, Clone, Copy)]
pub struct Orchestrator;

impl Orchestrator {
    pub fn new() -> Self {
        Self
    }

    #[instrument(
        skip_all,
        fields(stacks = plan.len(), environment = %settings.environment.uri())
    )]
    pub fn construct(
        &self,
        plan: &ConstructionPlan,
        settings: &DeploymentSettings,
    ) -> StackgraphResult<Assembly> {
        let order = DependencyResolver::resolve(plan)?;
        debug!(
            order = ?order.iter().map(|&i| plan.entries()[i].id().as_str()).collect::<Vec<_>>(),
            "Construction order resolved"
        );

        let mut registry = OutputRegistry::new();
        let mut assembly = Assembly::new(settings.environment.clone());

        for index in order {
            let entry = &plan.entries()[index];
            let deps = registry.dependencies_of(entry.id(), entry.dependencies())?;
            let stack = stacks::construct(entry, settings, &deps)?;

            info!(
                stack = %entry.id(),
                kind = %entry.kind(),
                resources = stack.definition.resources().len(),
                outputs = stack.definition.outputs().len(),
                "Constructed stack"
            );

            registry.record(entry.id().clone(), stack.outputs.clone());
            assembly.push(stack);
        }

        info!(stacks = assembly.len(), "Assembly constructed");
        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, PlanEntry, StackId, StackKind};
    use crate::error::{ErrorCategory, StackgraphError};

    fn id(s: &str) -> StackId {
        StackId::new(s).unwrap()
    }

    #[test]
    fn canonical_plan_builds_every_stack_once() {
        let plan = ConstructionPlan::canonical().unwrap();
        let assembly = Orchestrator::new()
            .construct(&plan, &DeploymentSettings::default())
            .unwrap();

        assert_eq!(assembly.len(), plan.len());
        let mut ids: Vec<_> = assembly.order().into_iter().map(|s| s.to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), plan.len());
    }

    #[test]
    fn graph_errors_are_reported_before_construction() {
        let plan = ConstructionPlan::new()
            .with_entry(PlanEntry::new(id("Vpc"), StackKind::Network).depends_on(id("Cluster")))
            .with_entry(PlanEntry::new(id("Cluster"), StackKind::Cluster).depends_on(id("Vpc")));

        let err = Orchestrator::new()
            .construct(&plan, &DeploymentSettings::default())
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Graph);
        assert!(matches!(
            err,
            StackgraphError::Domain(DomainError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn wiring_errors_name_the_stack() {
        let plan = ConstructionPlan::new()
            .with_entry(PlanEntry::new(id("Vpc"), StackKind::Network))
            .with_entry(PlanEntry::new(id("Api"), StackKind::Gateway).depends_on(id("Vpc")));

        let err = Orchestrator::new()
            .construct(&plan, &DeploymentSettings::default())
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Wiring);
        assert_eq!(err.stack(), Some("Api"));
        assert!(err.to_string().contains("vpc_link"));
    }
}
