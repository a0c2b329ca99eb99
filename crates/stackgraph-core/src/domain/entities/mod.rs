pub mod artifact_layout;
pub mod assembly;
pub mod outputs;
pub mod plan;
pub mod stack;

pub use crate::domain::DomainError;
pub use artifact_layout::{ArtifactFile, ArtifactLayout};
pub use assembly::{Assembly, ConstructedStack};
pub use outputs::{
    ClusterOutputs, DependencyOutputs, GatewayOutputs, LoadBalancerOutputs, NetworkOutputs,
    OutputRef, OutputRegistry, RegistryOutputs, RepositoryOutputs, ServiceOutputs, StackOutputs,
};
pub use plan::{ConstructionPlan, PlanEntry};
pub use stack::{
    DeletionPolicy, DeploymentSettings, Resource, StackDefinition, StackOutput, StackResource,
    StackScope,
};
