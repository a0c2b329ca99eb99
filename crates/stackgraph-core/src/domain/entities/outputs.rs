//! Typed stack outputs and the dependency view stacks wire themselves from.
//!
//! A stack never looks outputs up by name in a global table. Each kind
//! returns its own output struct, the orchestrator records it under the
//! producing stack id, and a dependent stack only ever sees the outputs of
//! the stacks it declared as dependencies (`DependencyOutputs`).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    error::DomainError,
    intrinsics,
    value_objects::{ServiceKind, StackId},
};

// ── OutputRef ────────────────────────────────────────────────────────────────

/// Handle to a value exported by one stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OutputRef {
    stack: StackId,
    name: String,
}

impl OutputRef {
    pub(crate) fn new(stack: StackId, name: impl Into<String>) -> Self {
        Self {
            stack,
            name: name.into(),
        }
    }

    pub fn stack(&self) -> &StackId {
        &self.stack
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<StackId>:<OutputName>`
    pub fn export_name(&self) -> String {
        format!("{}:{}", self.stack, self.name)
    }

    /// The `Fn::ImportValue` expression a consuming stack embeds.
    pub fn import(&self) -> Value {
        intrinsics::import_value(&self.export_name())
    }

    /// Import of a comma-joined list export, split back into a list.
    pub fn import_list(&self) -> Value {
        intrinsics::split(",", self.import())
    }
}

// ── Per-kind outputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryOutputs {
    pub repository_name: OutputRef,
    pub repository_arn: OutputRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryOutputs {
    pub repositories: BTreeMap<ServiceKind, RepositoryOutputs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkOutputs {
    pub vpc_id: OutputRef,
    pub vpc_cidr: OutputRef,
    /// Comma-joined public subnet ids.
    pub public_subnets: OutputRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterOutputs {
    pub cluster_name: OutputRef,
    pub cluster_arn: OutputRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadBalancerOutputs {
    pub nlb_arn: OutputRef,
    pub nlb_dns_name: OutputRef,
    pub alb_arn: OutputRef,
    pub alb_security_group: OutputRef,
    pub vpc_link: OutputRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOutputs {
    pub kind: ServiceKind,
    pub service_name: OutputRef,
    /// Present when the service publishes domain events.
    pub events_topic: Option<OutputRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOutputs {
    pub rest_api_id: OutputRef,
    pub api_url: OutputRef,
}

/// Outputs of any stack kind, as recorded by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StackOutputs {
    Registry(RegistryOutputs),
    Network(NetworkOutputs),
    Cluster(ClusterOutputs),
    LoadBalancer(LoadBalancerOutputs),
    Service(ServiceOutputs),
    Gateway(GatewayOutputs),
}

impl StackOutputs {
    pub fn as_registry(&self) -> Option<&RegistryOutputs> {
        match self {
            Self::Registry(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkOutputs> {
        match self {
            Self::Network(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterOutputs> {
        match self {
            Self::Cluster(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_load_balancer(&self) -> Option<&LoadBalancerOutputs> {
        match self {
            Self::LoadBalancer(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceOutputs> {
        match self {
            Self::Service(o) => Some(o),
            _ => None,
        }
    }

    /// Every exported value, for reporting.
    pub fn refs(&self) -> Vec<&OutputRef> {
        match self {
            Self::Registry(o) => o
                .repositories
                .values()
                .flat_map(|r| [&r.repository_name, &r.repository_arn])
                .collect(),
            Self::Network(o) => vec![&o.vpc_id, &o.vpc_cidr, &o.public_subnets],
            Self::Cluster(o) => vec![&o.cluster_name, &o.cluster_arn],
            Self::LoadBalancer(o) => vec![
                &o.nlb_arn,
                &o.nlb_dns_name,
                &o.alb_arn,
                &o.alb_security_group,
                &o.vpc_link,
            ],
            Self::Service(o) => std::iter::once(&o.service_name)
                .chain(o.events_topic.as_ref())
                .collect(),
            Self::Gateway(o) => vec![&o.rest_api_id, &o.api_url],
        }
    }
}

macro_rules! into_stack_outputs {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for StackOutputs {
                fn from(outputs: $ty) -> Self {
                    Self::$variant(outputs)
                }
            }
        )*
    };
}

into_stack_outputs! {
    RegistryOutputs => Registry,
    NetworkOutputs => Network,
    ClusterOutputs => Cluster,
    LoadBalancerOutputs => LoadBalancer,
    ServiceOutputs => Service,
    GatewayOutputs => Gateway,
}

// ── OutputRegistry ───────────────────────────────────────────────────────────

/// Outputs of the stacks constructed so far in one run.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    outputs: HashMap<StackId, StackOutputs>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stack: StackId, outputs: StackOutputs) {
        self.outputs.insert(stack, outputs);
    }

    pub fn get(&self, stack: &StackId) -> Option<&StackOutputs> {
        self.outputs.get(stack)
    }

    /// The outputs visible to `stack`: exactly those of `dependencies`.
    ///
    /// Fails if a dependency has not been constructed yet, which only
    /// happens when the caller ignores the resolved order.
    pub fn dependencies_of<'a>(
        &'a self,
        stack: &'a StackId,
        dependencies: &'a [StackId],
    ) -> Result<DependencyOutputs<'a>, DomainError> {
        let available = dependencies
            .iter()
            .map(|dep| {
                self.outputs
                    .get(dep)
                    .map(|outputs| (dep, outputs))
                    .ok_or_else(|| DomainError::UnknownDependency {
                        stack: stack.to_string(),
                        dependency: dep.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DependencyOutputs { stack, available })
    }
}

// ── DependencyOutputs ────────────────────────────────────────────────────────

/// Read-only view over the outputs of one stack's declared dependencies.
#[derive(Debug, Clone)]
pub struct DependencyOutputs<'a> {
    stack: &'a StackId,
    available: Vec<(&'a StackId, &'a StackOutputs)>,
}

impl<'a> DependencyOutputs<'a> {
    pub fn new(stack: &'a StackId, available: Vec<(&'a StackId, &'a StackOutputs)>) -> Self {
        Self { stack, available }
    }

    /// The stack being wired.
    pub fn stack(&self) -> &StackId {
        self.stack
    }

    /// Find the single dependency that provides `output`.
    ///
    /// `pick` extracts the value from a dependency's outputs. No match is a
    /// `MissingOutput`; more than one is an `AmbiguousOutput`.
    pub fn require<T: ?Sized>(
        &self,
        output: &str,
        pick: impl Fn(&'a StackOutputs) -> Option<&'a T>,
    ) -> Result<&'a T, DomainError> {
        let mut found = self
            .available
            .iter()
            .filter_map(|(id, outputs)| pick(*outputs).map(|value| (*id, value)));

        let Some((_, value)) = found.next() else {
            return Err(DomainError::MissingOutput {
                stack: self.stack.to_string(),
                output: output.to_string(),
            });
        };

        let others: Vec<&StackId> = found.map(|(id, _)| id).collect();
        if !others.is_empty() {
            return Err(DomainError::AmbiguousOutput {
                stack: self.stack.to_string(),
                output: output.to_string(),
                candidates: self
                    .available
                    .iter()
                    .filter(|(_, outputs)| pick(*outputs).is_some())
                    .map(|(id, _)| id.to_string())
                    .collect(),
            });
        }

        Ok(value)
    }

    pub fn network(&self, output: &str) -> Result<&'a NetworkOutputs, DomainError> {
        self.require(output, StackOutputs::as_network)
    }

    pub fn cluster(&self, output: &str) -> Result<&'a ClusterOutputs, DomainError> {
        self.require(output, StackOutputs::as_cluster)
    }

    pub fn load_balancer(&self, output: &str) -> Result<&'a LoadBalancerOutputs, DomainError> {
        self.require(output, StackOutputs::as_load_balancer)
    }

    pub fn registry(&self, output: &str) -> Result<&'a RegistryOutputs, DomainError> {
        self.require(output, StackOutputs::as_registry)
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}
