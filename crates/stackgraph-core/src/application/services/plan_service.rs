//! Plan Service - loads a construction plan and reports its resolved order.

use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::PlanSource},
    domain::{ConstructionPlan, DependencyResolver, StackId, StackKind},
    error::StackgraphResult,
};

/// One stack of a resolved plan, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStack {
    /// 1-based position in construction order.
    pub position: usize,
    pub id: StackId,
    pub kind: StackKind,
    pub depends_on: Vec<StackId>,
}

/// A plan in construction order together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub source: String,
    pub stacks: Vec<PlannedStack>,
}

impl PlanReport {
    /// Every `(dependency, dependent)` edge, in construction order of the dependent.
    pub fn edges(&self) -> Vec<(&StackId, &StackId)> {
        self.stacks
            .iter()
            .flat_map(|s| s.depends_on.iter().map(move |d| (d, &s.id)))
            .collect()
    }
}

pub struct PlanService {
    source: Box<dyn PlanSource>,
}

impl PlanService {
    pub fn new(source: Box<dyn PlanSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// Load the plan; graph errors surface later, from the resolver.
    #[instrument(skip_all, fields(source = %self.source.describe()))]
    pub fn load(&self) -> StackgraphResult<ConstructionPlan> {
        let plan = self.source.load()?;
        if plan.is_empty() {
            return Err(ApplicationError::PlanSourceFailed {
                source_name: self.source.describe(),
                reason: "plan declares no stacks".into(),
            }
            .into());
        }
        info!(stacks = plan.len(), "Plan loaded");
        Ok(plan)
    }

    /// Resolve `plan` into a report in construction order.
    pub fn report(&self, plan: &ConstructionPlan) -> StackgraphResult<PlanReport> {
        let order = DependencyResolver::resolve(plan)?;
        debug!(stacks = order.len(), "Plan resolved");

        let stacks = order
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let entry = &plan.entries()[index];
                PlannedStack {
                    position: position + 1,
                    id: entry.id().clone(),
                    kind: entry.kind(),
                    depends_on: entry.dependencies().to_vec(),
                }
            })
            .collect();

        Ok(PlanReport {
            source: self.source.describe(),
            stacks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockPlanSource;
    use crate::domain::PlanEntry;
    use crate::error::ErrorCategory;

    fn source(plan: ConstructionPlan) -> MockPlanSource {
        let mut source = MockPlanSource::new();
        source.expect_describe().return_const("test plan".to_string());
        source.expect_load().returning(move || Ok(plan.clone()));
        source
    }

    #[test]
    fn report_follows_construction_order() {
        let plan = ConstructionPlan::canonical().unwrap();
        let service = PlanService::new(Box::new(source(plan.clone())));

        let report = service.report(&service.load().unwrap()).unwrap();
        let ids: Vec<&str> = report.stacks.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(
            ids,
            [
                "Ecr",
                "Vpc",
                "Cluster",
                "Nlb",
                "ProductsService",
                "AuditService",
                "InvoicesService",
                "Api"
            ]
        );
        assert_eq!(report.stacks[0].position, 1);
        assert_eq!(report.source, "test plan");
        assert!(
            report
                .edges()
                .iter()
                .any(|(from, to)| from.as_str() == "Nlb" && to.as_str() == "Api")
        );
    }

    #[test]
    fn empty_plan_is_a_plan_source_error() {
        let service = PlanService::new(Box::new(source(ConstructionPlan::new())));

        let err = service.load().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn report_surfaces_graph_errors() {
        let plan = ConstructionPlan::new().with_entry(
            PlanEntry::new(StackId::new("Api").unwrap(), StackKind::Gateway)
                .depends_on(StackId::new("Nlb").unwrap()),
        );
        let service = PlanService::new(Box::new(source(plan.clone())));

        let err = service.report(&plan).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Graph);
    }
}
