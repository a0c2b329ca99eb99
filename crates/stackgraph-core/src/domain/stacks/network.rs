use serde_json::{Value, json};

use crate::domain::{
    entities::{DependencyOutputs, NetworkOutputs, Resource, StackScope},
    error::DomainError,
    intrinsics::{availability_zones, get_att, join, reference, select},
    validation::DomainValidator,
};

/// Shape of the VPC. Leaf stack: nothing is wired in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub cidr: &'static str,
    pub max_azs: u32,
    pub nat_gateways: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "ECommerceVPC",
            cidr: "10.0.0.0/16",
            max_azs: 2,
            nat_gateways: 0,
        }
    }
}

/// VPC with one public subnet per availability zone.
///
/// No NAT gateways are created, so workloads reach the internet through
/// public IPs on the public subnets.
pub struct NetworkStack;

impl super::StackUnit for NetworkStack {
    type Config = NetworkConfig;
    type Outputs = NetworkOutputs;

    fn wire(&self, _deps: &DependencyOutputs<'_>) -> Result<NetworkConfig, DomainError> {
        Ok(NetworkConfig::default())
    }

    fn construct(
        &self,
        scope: &mut StackScope,
        config: NetworkConfig,
    ) -> Result<NetworkOutputs, DomainError> {
        DomainValidator::validate_range(scope.id(), "max AZs", config.max_azs, 1, 4)?;
        DomainValidator::validate_range(scope.id(), "NAT gateways", config.nat_gateways, 0, 0)?;
        scope.set_description(format!("{} network", config.name));

        let vpc = scope.add(Resource::new(
            "Vpc",
            "AWS::EC2::VPC",
            json!({
                "CidrBlock": config.cidr,
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
                "InstanceTenancy": "default",
                "Tags": [{ "Key": "Name", "Value": config.name }],
            }),
        ))?;

        let gateway = scope.add(Resource::new(
            "InternetGateway",
            "AWS::EC2::InternetGateway",
            json!({ "Tags": [{ "Key": "Name", "Value": config.name }] }),
        ))?;
        let attachment = scope.add(Resource::new(
            "GatewayAttachment",
            "AWS::EC2::VPCGatewayAttachment",
            json!({ "VpcId": reference(&vpc), "InternetGatewayId": reference(&gateway) }),
        ))?;

        let mut subnets: Vec<Value> = Vec::new();
        for az in 0..config.max_azs {
            let n = az + 1;
            let subnet = scope.add(Resource::new(
                format!("PublicSubnet{n}"),
                "AWS::EC2::Subnet",
                json!({
                    "VpcId": reference(&vpc),
                    "AvailabilityZone": select(az as usize, availability_zones()),
                    "CidrBlock": format!("10.0.{}.0/18", az * 64),
                    "MapPublicIpOnLaunch": true,
                    "Tags": [{ "Key": "Name", "Value": format!("{}/PublicSubnet{n}", config.name) }],
                }),
            ))?;
            let route_table = scope.add(Resource::new(
                format!("PublicSubnet{n}RouteTable"),
                "AWS::EC2::RouteTable",
                json!({ "VpcId": reference(&vpc) }),
            ))?;
            scope.add(Resource::new(
                format!("PublicSubnet{n}RouteTableAssociation"),
                "AWS::EC2::SubnetRouteTableAssociation",
                json!({ "RouteTableId": reference(&route_table), "SubnetId": reference(&subnet) }),
            ))?;
            scope.add(
                Resource::new(
                    format!("PublicSubnet{n}DefaultRoute"),
                    "AWS::EC2::Route",
                    json!({
                        "RouteTableId": reference(&route_table),
                        "DestinationCidrBlock": "0.0.0.0/0",
                        "GatewayId": reference(&gateway),
                    }),
                )
                .depends_on(&attachment),
            )?;
            subnets.push(reference(&subnet));
        }

        Ok(NetworkOutputs {
            vpc_id: scope.export("VpcId", reference(&vpc))?,
            vpc_cidr: scope.export("VpcCidr", get_att(&vpc, "CidrBlock"))?,
            public_subnets: scope.export("PublicSubnetIds", join(",", subnets))?,
        })
    }
}
