// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for stackgraph.
//!
//! This module contains the stack graph and the stack kinds, with no I/O.
//! Rendering templates and writing them out are handled via ports (traits)
//! defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No logging**: Only the application layer emits tracing events
//! - **Immutable results**: Constructed stacks and outputs are Clone + PartialEq
//! - **Typed wiring**: Stacks exchange typed outputs, never names looked up at runtime
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod intrinsics;
pub mod profiles;
pub mod resolver;
pub mod stacks;
pub mod value_objects;

mod validation;

// Re-exports for convenience
pub use entities::{
    ArtifactFile, ArtifactLayout, Assembly, ClusterOutputs, ConstructedStack, ConstructionPlan,
    DeletionPolicy, DependencyOutputs, DeploymentSettings, GatewayOutputs, LoadBalancerOutputs,
    NetworkOutputs, OutputRef, OutputRegistry, PlanEntry, RegistryOutputs, RepositoryOutputs,
    Resource, ServiceOutputs, StackDefinition, StackOutput, StackOutputs, StackResource,
    StackScope,
};

pub use error::{DomainError, ErrorCategory};

pub use resolver::DependencyResolver;

pub use stacks::StackUnit;

pub use value_objects::{
    AccountId, DeploymentEnvironment, LogicalId, Region, ServiceKind, StackId, StackKind, Tags,
};

pub use validation::{DomainValidator, NameRule};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn id(s: &str) -> StackId {
        StackId::new(s).unwrap()
    }

    fn settings() -> DeploymentSettings {
        DeploymentSettings {
            environment: DeploymentEnvironment::parse(Some("123456789012"), "eu-west-1").unwrap(),
            tags: Tags::new().with("team", "Alpha").unwrap(),
        }
    }

    /// Construct every stack of `plan` in resolved order.
    fn construct_all(plan: &ConstructionPlan) -> Result<Vec<ConstructedStack>, DomainError> {
        let settings = settings();
        let mut registry = OutputRegistry::new();
        let mut built = Vec::new();

        for i in DependencyResolver::resolve(plan)? {
            let entry = &plan.entries()[i];
            let stack = {
                let deps = registry.dependencies_of(entry.id(), entry.dependencies())?;
                stacks::construct(entry, &settings, &deps)?
            };
            registry.record(entry.id().clone(), stack.outputs.clone());
            built.push(stack);
        }
        Ok(built)
    }

    fn stack<'a>(built: &'a [ConstructedStack], name: &str) -> &'a StackDefinition {
        &built
            .iter()
            .find(|s| s.id().as_str() == name)
            .unwrap()
            .definition
    }

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn stack_kind_parses_correctly() {
        assert_eq!(StackKind::from_str("network").unwrap(), StackKind::Network);
        assert_eq!(StackKind::from_str("NLB").unwrap(), StackKind::LoadBalancer);
        assert_eq!(
            StackKind::from_str("audit-service").unwrap(),
            StackKind::Service(ServiceKind::Audit)
        );
        assert!(StackKind::from_str("shipping-service").is_err());
        assert!(StackKind::from_str("database").is_err());
    }

    #[test]
    fn unknown_kinds_are_reported_as_written() {
        assert_eq!(
            ServiceKind::from_str("Shipping").unwrap_err(),
            DomainError::UnknownStackKind("Shipping".into())
        );
        assert_eq!(
            StackKind::from_str("Shipping-Service").unwrap_err(),
            DomainError::UnknownStackKind("Shipping-Service".into())
        );
        assert_eq!(
            StackKind::from_str("database").unwrap_err(),
            DomainError::UnknownStackKind("database".into())
        );
    }

    #[test]
    fn stack_kind_round_trips_through_as_str() {
        for kind in [
            StackKind::Registry,
            StackKind::Network,
            StackKind::Cluster,
            StackKind::LoadBalancer,
            StackKind::Service(ServiceKind::Products),
            StackKind::Service(ServiceKind::Audit),
            StackKind::Service(ServiceKind::Invoices),
            StackKind::Gateway,
        ] {
            assert_eq!(StackKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn stack_id_rules() {
        assert!(StackId::new("ProductsService").is_ok());
        assert!(StackId::new("Api-2").is_ok());
        assert!(StackId::new("").is_err());
        assert!(StackId::new("2Api").is_err());
        assert!(StackId::new("Api:2").is_err());
    }

    #[test]
    fn environment_uri_defaults_to_unknown_account() {
        let agnostic = DeploymentEnvironment::parse(None, "us-east-1").unwrap();
        assert_eq!(agnostic.uri(), "aws://unknown-account/us-east-1");

        let pinned = DeploymentEnvironment::parse(Some("123456789012"), "us-gov-west-1").unwrap();
        assert_eq!(pinned.uri(), "aws://123456789012/us-gov-west-1");

        assert!(DeploymentEnvironment::parse(Some("1234"), "us-east-1").is_err());
        assert!(DeploymentEnvironment::parse(None, "US-EAST-1").is_err());
    }

    #[test]
    fn tags_reject_reserved_prefix_and_parse_pairs() {
        assert!(Tags::new().with("aws:cloudformation", "x").is_err());
        assert_eq!(
            Tags::parse_pair("team=Alpha").unwrap(),
            ("team".to_string(), "Alpha".to_string())
        );
        assert!(Tags::parse_pair("team").is_err());
    }

    // ========================================================================
    // Stack Construction Tests
    // ========================================================================

    #[test]
    fn canonical_plan_constructs_every_stack() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let order: Vec<&str> = built.iter().map(|s| s.id().as_str()).collect();

        assert_eq!(
            order,
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
    }

    #[test]
    fn registry_exports_one_repository_per_service() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let ecr = stack(&built, "Ecr");

        assert_eq!(ecr.resources().len(), 3);
        let repo = ecr.resource("ProductsServiceRepository").unwrap();
        assert_eq!(repo.properties["RepositoryName"], "productsservice");
        assert_eq!(repo.deletion_policy, Some(DeletionPolicy::Delete));
        assert!(ecr.output_names().contains(&"AuditServiceRepositoryArn"));
    }

    #[test]
    fn network_has_two_public_subnets() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let vpc = stack(&built, "Vpc");

        let subnets = vpc
            .resources()
            .iter()
            .filter(|r| r.resource_type == "AWS::EC2::Subnet")
            .count();
        assert_eq!(subnets, 2);
        assert!(
            vpc.resources()
                .iter()
                .all(|r| r.resource_type != "AWS::EC2::NatGateway")
        );
        assert_eq!(
            vpc.resource("Vpc").unwrap().properties["Tags"][0]["Value"],
            "ECommerceVPC"
        );
    }

    #[test]
    fn products_service_exports_events_topic() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let products = built
            .iter()
            .find(|s| s.id().as_str() == "ProductsService")
            .unwrap();

        match &products.outputs {
            StackOutputs::Service(outputs) => {
                let topic = outputs.events_topic.as_ref().unwrap();
                assert_eq!(topic.export_name(), "ProductsService:EventsTopicArn");
            }
            other => panic!("unexpected outputs: {other:?}"),
        }

        let table = products.definition.resource("ProductsDdb").unwrap();
        assert_eq!(
            table.properties["GlobalSecondaryIndexes"][0]["IndexName"],
            "codeIdx"
        );
    }

    #[test]
    fn audit_queues_subscribe_to_imported_topic() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let audit = stack(&built, "AuditService");

        let subscription = audit.resource("ProductEventsQueueSubscription").unwrap();
        assert_eq!(
            subscription.properties["TopicArn"],
            json!({ "Fn::ImportValue": "ProductsService:EventsTopicArn" })
        );
        assert_eq!(
            subscription.properties["FilterPolicy"]["eventType"],
            json!(["PRODUCT_CREATED", "PRODUCT_UPDATED", "PRODUCT_DELETED"])
        );

        let failures = audit.resource("ProductFailureEventsQueue").unwrap();
        assert_eq!(failures.properties["RedrivePolicy"]["maxReceiveCount"], 3);
    }

    #[test]
    fn service_ingress_follows_profile() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();

        let products = stack(&built, "ProductsService")
            .resource("ServiceSecurityGroup")
            .unwrap();
        assert_eq!(
            products.properties["SecurityGroupIngress"][0]["CidrIp"],
            "0.0.0.0/0"
        );

        let invoices = stack(&built, "InvoicesService")
            .resource("ServiceSecurityGroup")
            .unwrap();
        assert_eq!(
            invoices.properties["SecurityGroupIngress"][0]["CidrIp"],
            json!({ "Fn::ImportValue": "Vpc:VpcCidr" })
        );
    }

    #[test]
    fn task_definition_carries_app_and_xray_containers() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let task = stack(&built, "ProductsService")
            .resource("TaskDefinition")
            .unwrap();

        let containers = &task.properties["ContainerDefinitions"];
        assert_eq!(containers[0]["Name"], "productsService");
        assert_eq!(containers[0]["PortMappings"][0]["ContainerPort"], 8080);
        assert_eq!(containers[1]["Name"], "XRayProductsService");
        assert_eq!(containers[1]["PortMappings"][0]["Protocol"], "udp");
        assert_eq!(task.properties["Cpu"], "512");

        let region = containers[0]["Environment"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["Name"] == "AWS_REGION")
            .unwrap();
        assert_eq!(region["Value"], "eu-west-1");
    }

    #[test]
    fn only_invoices_scales() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();

        let target = stack(&built, "InvoicesService")
            .resource("ScalableTarget")
            .unwrap();
        assert_eq!(target.properties["MinCapacity"], 2);
        assert_eq!(target.properties["MaxCapacity"], 4);
        assert!(
            stack(&built, "ProductsService")
                .resource("ScalableTarget")
                .is_none()
        );
    }

    #[test]
    fn gateway_proxies_routes_through_vpc_link() {
        let built = construct_all(&ConstructionPlan::canonical().unwrap()).unwrap();
        let api = stack(&built, "Api");

        let method = api.resource("ProductIdDeleteMethod").unwrap();
        let integration = &method.properties["Integration"];
        assert_eq!(integration["Type"], "HTTP_PROXY");
        assert_eq!(integration["ConnectionType"], "VPC_LINK");
        assert_eq!(
            integration["ConnectionId"],
            json!({ "Fn::ImportValue": "Nlb:VpcLinkId" })
        );
        assert_eq!(integration["Uri"]["Fn::Join"][1][2], ":8080/api/products/{id}");
        assert_eq!(
            integration["RequestParameters"]["integration.request.path.id"],
            "method.request.path.id"
        );
        assert_eq!(
            api.resource("Deployment").unwrap().depends_on.len(),
            stacks::ROUTES.len()
        );
    }

    // ========================================================================
    // Wiring Failure Tests
    // ========================================================================

    #[test]
    fn gateway_without_load_balancer_is_missing_vpc_link() {
        let plan = ConstructionPlan::new()
            .with_entry(PlanEntry::new(id("Api"), StackKind::Gateway));

        assert_eq!(
            construct_all(&plan).unwrap_err(),
            DomainError::MissingOutput {
                stack: "Api".into(),
                output: "vpc_link".into()
            }
        );
    }

    #[test]
    fn audit_without_products_is_missing_events_topic() {
        let plan = ConstructionPlan::canonical().unwrap();
        let mut trimmed = ConstructionPlan::new();
        for entry in plan.entries() {
            if entry.id() == "AuditService" {
                let mut audit = PlanEntry::new(entry.id().clone(), entry.kind());
                for dep in entry.dependencies().iter().filter(|d| *d != "ProductsService") {
                    audit = audit.depends_on(dep.clone());
                }
                trimmed.push(audit);
            } else {
                trimmed.push(entry.clone());
            }
        }

        let err = construct_all(&trimmed).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingOutput {
                stack: "AuditService".into(),
                output: "events_topic".into()
            }
        );
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn service_without_registry_names_its_repository() {
        let plan = ConstructionPlan::new()
            .with_entry(PlanEntry::new(id("Vpc"), StackKind::Network))
            .with_entry(PlanEntry::new(id("Cluster"), StackKind::Cluster).depends_on(id("Vpc")))
            .with_entry(PlanEntry::new(id("Nlb"), StackKind::LoadBalancer).depends_on(id("Vpc")))
            .with_entry(
                PlanEntry::new(id("Invoices"), StackKind::Service(ServiceKind::Invoices))
                    .depends_on(id("Vpc"))
                    .depends_on(id("Cluster"))
                    .depends_on(id("Nlb")),
            );

        assert_eq!(
            construct_all(&plan).unwrap_err(),
            DomainError::MissingOutput {
                stack: "Invoices".into(),
                output: "invoices_repository".into()
            }
        );
    }
}
