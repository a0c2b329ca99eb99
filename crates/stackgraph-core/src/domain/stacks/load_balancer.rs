use serde_json::json;

use crate::domain::{
    entities::{DependencyOutputs, LoadBalancerOutputs, OutputRef, Resource, StackScope},
    error::DomainError,
    intrinsics::{get_att, reference},
    validation::{DomainValidator, NameRule},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerConfig {
    pub vpc_id: OutputRef,
    pub vpc_cidr: OutputRef,
    pub subnets: OutputRef,
}

/// Internal network and application load balancers plus the API Gateway
/// VPC link that targets the network load balancer.
pub struct LoadBalancerStack;

impl LoadBalancerStack {
    pub const NLB_NAME: &'static str = "ECommerceNlb";
    pub const ALB_NAME: &'static str = "ECommerceAlb";
    pub const VPC_LINK_NAME: &'static str = "ECommerceVpcLink";
}

impl super::StackUnit for LoadBalancerStack {
    type Config = LoadBalancerConfig;
    type Outputs = LoadBalancerOutputs;

    fn wire(&self, deps: &DependencyOutputs<'_>) -> Result<LoadBalancerConfig, DomainError> {
        let network = deps.network("vpc_id")?;
        Ok(LoadBalancerConfig {
            vpc_id: network.vpc_id.clone(),
            vpc_cidr: network.vpc_cidr.clone(),
            subnets: network.public_subnets.clone(),
        })
    }

    fn construct(
        &self,
        scope: &mut StackScope,
        config: LoadBalancerConfig,
    ) -> Result<LoadBalancerOutputs, DomainError> {
        for name in [Self::NLB_NAME, Self::ALB_NAME] {
            DomainValidator::validate_name(scope.id(), name, name, NameRule::LoadBalancer)?;
        }
        scope.set_description("Internal load balancers and the API Gateway VPC link");

        let nlb = scope.add(Resource::new(
            "Nlb",
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
            json!({
                "Name": Self::NLB_NAME,
                "Type": "network",
                "Scheme": "internal",
                "Subnets": config.subnets.import_list(),
            }),
        ))?;

        let alb_security_group = scope.add(Resource::new(
            "AlbSecurityGroup",
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": "Security group of the internal application load balancer",
                "VpcId": config.vpc_id.import(),
                "SecurityGroupIngress": [{
                    "IpProtocol": "tcp",
                    "FromPort": 0,
                    "ToPort": 65535,
                    "CidrIp": config.vpc_cidr.import(),
                    "Description": "Traffic from inside the VPC",
                }],
                "SecurityGroupEgress": [{ "IpProtocol": "-1", "CidrIp": "0.0.0.0/0" }],
            }),
        ))?;

        let alb = scope.add(Resource::new(
            "Alb",
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
            json!({
                "Name": Self::ALB_NAME,
                "Type": "application",
                "Scheme": "internal",
                "Subnets": config.subnets.import_list(),
                "SecurityGroups": [get_att(&alb_security_group, "GroupId")],
            }),
        ))?;

        let vpc_link = scope.add(Resource::new(
            "VpcLink",
            "AWS::ApiGateway::VpcLink",
            json!({
                "Name": Self::VPC_LINK_NAME,
                "TargetArns": [reference(&nlb)],
            }),
        ))?;

        Ok(LoadBalancerOutputs {
            nlb_arn: scope.export("NlbArn", reference(&nlb))?,
            nlb_dns_name: scope.export("NlbDnsName", get_att(&nlb, "DNSName"))?,
            alb_arn: scope.export("AlbArn", reference(&alb))?,
            alb_security_group: scope.export(
                "AlbSecurityGroupId",
                get_att(&alb_security_group, "GroupId"),
            )?,
            vpc_link: scope.export("VpcLinkId", reference(&vpc_link))?,
        })
    }
}
