use serde_json::json;

use crate::domain::{
    entities::{ClusterOutputs, DependencyOutputs, Resource, StackScope},
    error::DomainError,
    intrinsics::{get_att, reference},
};

/// The cluster is bound to the network but takes no values from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig;

/// ECS cluster with Container Insights, bound to the network's VPC.
pub struct ClusterStack;

impl ClusterStack {
    pub const CLUSTER_NAME: &'static str = "ECommerce";
}

impl super::StackUnit for ClusterStack {
    type Config = ClusterConfig;
    type Outputs = ClusterOutputs;

    fn wire(&self, deps: &DependencyOutputs<'_>) -> Result<ClusterConfig, DomainError> {
        deps.network("vpc_id")?;
        Ok(ClusterConfig)
    }

    fn construct(
        &self,
        scope: &mut StackScope,
        _config: ClusterConfig,
    ) -> Result<ClusterOutputs, DomainError> {
        scope.set_description("ECS cluster of the e-commerce services");

        let cluster = scope.add(Resource::new(
            "Cluster",
            "AWS::ECS::Cluster",
            json!({
                "ClusterName": Self::CLUSTER_NAME,
                "ClusterSettings": [{ "Name": "containerInsights", "Value": "enabled" }],
            }),
        ))?;
        scope.add(Resource::new(
            "ClusterCapacityProviders",
            "AWS::ECS::ClusterCapacityProviderAssociations",
            json!({
                "Cluster": reference(&cluster),
                "CapacityProviders": ["FARGATE", "FARGATE_SPOT"],
                "DefaultCapacityProviderStrategy": [],
            }),
        ))?;

        Ok(ClusterOutputs {
            cluster_name: scope.export("ClusterName", reference(&cluster))?,
            cluster_arn: scope.export("ClusterArn", get_att(&cluster, "Arn"))?,
        })
    }
}
