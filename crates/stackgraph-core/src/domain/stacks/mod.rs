//! Stack units: one per stack kind.
//!
//! Every unit follows the same two-phase contract. `wire` collects the
//! typed inputs the unit needs from its dependencies' outputs; `construct`
//! declares resources and exports into a `StackScope`. Neither phase reads
//! anything but its arguments.

mod cluster;
mod gateway;
mod load_balancer;
mod network;
mod registry;
mod service;

pub use cluster::{ClusterConfig, ClusterStack};
pub use gateway::{GatewayConfig, GatewayStack, ROUTES, Route};
pub use load_balancer::{LoadBalancerConfig, LoadBalancerStack};
pub use network::{NetworkConfig, NetworkStack};
pub use registry::RegistryStack;
pub use service::{ServiceConfig, ServiceStack};

use crate::domain::{
    entities::{
        ConstructedStack, DependencyOutputs, DeploymentSettings, PlanEntry, StackOutputs,
        StackScope,
    },
    error::DomainError,
    value_objects::StackKind,
};

/// The contract every stack kind implements.
pub trait StackUnit {
    /// Inputs gathered from dependency outputs.
    type Config;

    /// Typed outputs handed to dependents.
    type Outputs: Into<StackOutputs>;

    fn wire(&self, deps: &DependencyOutputs<'_>) -> Result<Self::Config, DomainError>;

    fn construct(
        &self,
        scope: &mut StackScope,
        config: Self::Config,
    ) -> Result<Self::Outputs, DomainError>;
}

/// Build the stack described by `entry` from the outputs in `deps`.
pub fn construct(
    entry: &PlanEntry,
    settings: &DeploymentSettings,
    deps: &DependencyOutputs<'_>,
) -> Result<ConstructedStack, DomainError> {
    let scope = StackScope::new(entry, settings);

    match entry.kind() {
        StackKind::Registry => build(&RegistryStack, scope, deps),
        StackKind::Network => build(&NetworkStack, scope, deps),
        StackKind::Cluster => build(&ClusterStack, scope, deps),
        StackKind::LoadBalancer => build(&LoadBalancerStack, scope, deps),
        StackKind::Service(kind) => build(&ServiceStack::new(kind), scope, deps),
        StackKind::Gateway => build(&GatewayStack, scope, deps),
    }
}

fn build<U: StackUnit>(
    unit: &U,
    mut scope: StackScope,
    deps: &DependencyOutputs<'_>,
) -> Result<ConstructedStack, DomainError> {
    let config = unit.wire(deps)?;
    let outputs = unit.construct(&mut scope, config)?;

    Ok(ConstructedStack {
        definition: scope.finish()?,
        outputs: outputs.into(),
    })
}
