//! Dependency resolution for construction plans.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::domain::{entities::plan::ConstructionPlan, error::DomainError, value_objects::StackId};

/// Validates a plan's edge set and orders it for construction.
pub struct DependencyResolver;

impl DependencyResolver {
    /// Topological order of `plan` as indices into `plan.entries()`.
    ///
    /// Kahn's algorithm. Among stacks that are ready at the same time the
    /// one declared first is emitted first, so the order is a pure function
    /// of the plan.
    pub fn resolve(plan: &ConstructionPlan) -> Result<Vec<usize>, DomainError> {
        let entries = plan.entries();
        if entries.is_empty() {
            return Err(DomainError::EmptyPlan);
        }

        let mut index: HashMap<&StackId, usize> = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id(), i).is_some() {
                return Err(DomainError::DuplicateStack {
                    stack: entry.id().to_string(),
                });
            }
        }

        let mut in_degree = vec![0usize; entries.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];

        for (i, entry) in entries.iter().enumerate() {
            for dependency in entry.dependencies() {
                if dependency == entry.id() {
                    return Err(DomainError::SelfDependency {
                        stack: entry.id().to_string(),
                    });
                }
                let &j = index
                    .get(dependency)
                    .ok_or_else(|| DomainError::UnknownDependency {
                        stack: entry.id().to_string(),
                        dependency: dependency.to_string(),
                    })?;
                dependents[j].push(i);
                in_degree[i] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        let mut order = Vec::with_capacity(entries.len());

        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() != entries.len() {
            // Everything left over sits on a cycle or behind one.
            let stacks = entries
                .iter()
                .zip(&in_degree)
                .filter(|(_, degree)| **degree > 0)
                .map(|(entry, _)| entry.id().to_string())
                .collect();
            return Err(DomainError::DependencyCycle { stacks });
        }

        Ok(order)
    }

    /// Stack ids of `plan` in construction order.
    pub fn order(plan: &ConstructionPlan) -> Result<Vec<&StackId>, DomainError> {
        let entries = plan.entries();
        Ok(Self::resolve(plan)?
            .into_iter()
            .map(|i| entries[i].id())
            .collect())
    }
}
