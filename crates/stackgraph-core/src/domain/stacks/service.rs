use serde_json::{Value, json};

use crate::domain::{
    entities::{
        DeletionPolicy, DependencyOutputs, OutputRef, RepositoryOutputs, Resource, ServiceOutputs,
        StackScope,
    },
    error::DomainError,
    intrinsics::{account_id, get_att, join, managed_policy_arn, partition, reference, sub},
    profiles::{
        self, DESIRED_COUNT, HEALTH_CHECK_PATH, IngressScope, LOG_RETENTION_DAYS, ServiceProfile,
        TASK_SIZE, XRAY_IMAGE, XRAY_PORT,
    },
    validation::{DomainValidator, NameRule},
    value_objects::{LogicalId, ServiceKind},
};

const HEALTH_CHECK_INTERVAL_SECS: u32 = 30;
const HEALTH_CHECK_TIMEOUT_SECS: u32 = 10;
const DEREGISTRATION_DELAY_SECS: u32 = 30;
const DLQ_RETENTION_SECS: u32 = 10 * 24 * 60 * 60;
const MAX_RECEIVE_COUNT: u32 = 3;

/// Inputs of a service stack, each taken from a declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub vpc_id: OutputRef,
    pub vpc_cidr: OutputRef,
    pub subnets: OutputRef,
    pub cluster_name: OutputRef,
    pub nlb_arn: OutputRef,
    pub alb_arn: OutputRef,
    pub alb_security_group: OutputRef,
    pub repository: RepositoryOutputs,
    /// Only wired for services that consume product events.
    pub events_topic: Option<OutputRef>,
}

/// One Fargate workload behind both load balancers.
pub struct ServiceStack {
    kind: ServiceKind,
}

impl ServiceStack {
    pub fn new(kind: ServiceKind) -> Self {
        Self { kind }
    }

    pub fn profile(&self) -> &'static ServiceProfile {
        profiles::profile(self.kind)
    }
}

/// Kind-specific data resources and what the containers need to use them.
#[derive(Default)]
struct Workload {
    environment: Vec<(&'static str, Value)>,
    statements: Vec<Value>,
    events_topic: Option<LogicalId>,
}

impl super::StackUnit for ServiceStack {
    type Config = ServiceConfig;
    type Outputs = ServiceOutputs;

    fn wire(&self, deps: &DependencyOutputs<'_>) -> Result<ServiceConfig, DomainError> {
        let profile = self.profile();
        let network = deps.network("vpc_id")?;
        let cluster = deps.cluster("cluster_name")?;
        let load_balancer = deps.load_balancer("nlb_arn")?;

        let repository_output = format!("{}_repository", self.kind);
        let repository = deps
            .registry(&repository_output)?
            .repositories
            .get(&self.kind)
            .ok_or_else(|| DomainError::MissingOutput {
                stack: deps.stack().to_string(),
                output: repository_output.clone(),
            })?;

        let events_topic = if profile.consumes_events {
            let topic = deps.require("events_topic", |outputs| {
                outputs
                    .as_service()
                    .and_then(|service| service.events_topic.as_ref())
            })?;
            Some(topic.clone())
        } else {
            None
        };

        Ok(ServiceConfig {
            vpc_id: network.vpc_id.clone(),
            vpc_cidr: network.vpc_cidr.clone(),
            subnets: network.public_subnets.clone(),
            cluster_name: cluster.cluster_name.clone(),
            nlb_arn: load_balancer.nlb_arn.clone(),
            alb_arn: load_balancer.alb_arn.clone(),
            alb_security_group: load_balancer.alb_security_group.clone(),
            repository: repository.clone(),
            events_topic,
        })
    }

    fn construct(
        &self,
        scope: &mut StackScope,
        config: ServiceConfig,
    ) -> Result<ServiceOutputs, DomainError> {
        let profile = self.profile();
        self.validate(scope, profile)?;
        scope.set_description(format!("{} on Fargate", profile.display_name));

        let workload = match self.kind {
            ServiceKind::Products => products_workload(scope)?,
            ServiceKind::Audit => {
                let topic = config
                    .events_topic
                    .as_ref()
                    .ok_or_else(|| DomainError::MissingOutput {
                        stack: scope.id().to_string(),
                        output: "events_topic".to_string(),
                    })?;
                audit_workload(scope, topic)?
            }
            ServiceKind::Invoices => Workload::default(),
        };

        let log_group = scope.add(
            Resource::new(
                "LogGroup",
                "AWS::Logs::LogGroup",
                json!({
                    "LogGroupName": profile.display_name,
                    "RetentionInDays": LOG_RETENTION_DAYS,
                }),
            )
            .deletion_policy(DeletionPolicy::Delete),
        )?;
        let xray_log_group = scope.add(
            Resource::new(
                "XRayLogGroup",
                "AWS::Logs::LogGroup",
                json!({
                    "LogGroupName": profile.xray_name(),
                    "RetentionInDays": LOG_RETENTION_DAYS,
                }),
            )
            .deletion_policy(DeletionPolicy::Delete),
        )?;

        // Roles
        let task_role = scope.add(Resource::new(
            "TaskRole",
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": assume_role("ecs-tasks.amazonaws.com"),
                "ManagedPolicyArns": [managed_policy_arn("AWSXrayWriteOnlyAccess")],
            }),
        ))?;
        if !workload.statements.is_empty() {
            scope.add(Resource::new(
                "TaskRoleDefaultPolicy",
                "AWS::IAM::Policy",
                json!({
                    "PolicyName": format!("{}TaskRolePolicy", profile.display_name),
                    "PolicyDocument": policy_document(workload.statements),
                    "Roles": [reference(&task_role)],
                }),
            ))?;
        }

        let execution_role = scope.add(Resource::new(
            "ExecutionRole",
            "AWS::IAM::Role",
            json!({ "AssumeRolePolicyDocument": assume_role("ecs-tasks.amazonaws.com") }),
        ))?;
        let execution_policy = scope.add(Resource::new(
            "ExecutionRoleDefaultPolicy",
            "AWS::IAM::Policy",
            json!({
                "PolicyName": format!("{}ExecutionRolePolicy", profile.display_name),
                "PolicyDocument": policy_document(vec![
                    json!({
                        "Effect": "Allow",
                        "Action": [
                            "ecr:BatchCheckLayerAvailability",
                            "ecr:GetDownloadUrlForLayer",
                            "ecr:BatchGetImage",
                        ],
                        "Resource": config.repository.repository_arn.import(),
                    }),
                    json!({ "Effect": "Allow", "Action": "ecr:GetAuthorizationToken", "Resource": "*" }),
                    json!({
                        "Effect": "Allow",
                        "Action": ["logs:CreateLogStream", "logs:PutLogEvents"],
                        "Resource": [get_att(&log_group, "Arn"), get_att(&xray_log_group, "Arn")],
                    }),
                ]),
                "Roles": [reference(&execution_role)],
            }),
        ))?;

        // Task definition
        let region = scope.environment().region.to_string();
        let mut environment = vec![
            ("Server_PORT", json!(profile.port.to_string())),
            ("AWS_REGION", json!(region)),
            ("AWS_XRAY_DAEMON_ADDRESS", json!(format!("0.0.0.0:{XRAY_PORT}"))),
            ("AWS_XRAY_CONTEXT_MISSING", json!("IGNORE_ERROR")),
            ("AWS_XRAY_TRACING_NAME", json!(profile.tracing_name)),
            ("LOGGING_LEVEL_ROOT", json!("INFO")),
        ];
        environment.extend(workload.environment);

        let image = sub(
            &format!(
                "${{AWS::AccountId}}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/${{Repository}}:{}",
                profile.image_tag
            ),
            json!({ "Repository": config.repository.repository_name.import() }),
        );

        let task_definition = scope.add(
            Resource::new(
                "TaskDefinition",
                "AWS::ECS::TaskDefinition",
                json!({
                    "Family": profile.family,
                    "Cpu": TASK_SIZE.task.cpu.to_string(),
                    "Memory": TASK_SIZE.task.memory_mib.to_string(),
                    "NetworkMode": "awsvpc",
                    "RequiresCompatibilities": ["FARGATE"],
                    "TaskRoleArn": get_att(&task_role, "Arn"),
                    "ExecutionRoleArn": get_att(&execution_role, "Arn"),
                    "ContainerDefinitions": [
                        {
                            "Name": profile.container_name,
                            "Image": image,
                            "Essential": true,
                            "Cpu": TASK_SIZE.app.cpu,
                            "Memory": TASK_SIZE.app.memory_mib,
                            "PortMappings": [{ "ContainerPort": profile.port, "Protocol": "tcp" }],
                            "Environment": environment
                                .into_iter()
                                .map(|(name, value)| json!({ "Name": name, "Value": value }))
                                .collect::<Vec<_>>(),
                            "LogConfiguration": aws_logs(&log_group, profile.display_name, &region),
                        },
                        {
                            "Name": profile.xray_name(),
                            "Image": XRAY_IMAGE,
                            "Essential": true,
                            "Cpu": TASK_SIZE.sidecar.cpu,
                            "Memory": TASK_SIZE.sidecar.memory_mib,
                            "PortMappings": [{ "ContainerPort": XRAY_PORT, "Protocol": "udp" }],
                            "LogConfiguration": aws_logs(&xray_log_group, &profile.xray_name(), &region),
                        },
                    ],
                }),
            )
            .depends_on(&execution_policy),
        )?;

        // Networking
        let ingress_source = match profile.ingress {
            IngressScope::Anywhere => json!("0.0.0.0/0"),
            IngressScope::VpcCidr => config.vpc_cidr.import(),
        };
        let security_group = scope.add(Resource::new(
            "ServiceSecurityGroup",
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": format!("{} tasks", profile.display_name),
                "VpcId": config.vpc_id.import(),
                "SecurityGroupIngress": [
                    {
                        "IpProtocol": "tcp",
                        "FromPort": profile.port,
                        "ToPort": profile.port,
                        "CidrIp": ingress_source,
                        "Description": format!("tcp:{}", profile.port),
                    },
                    {
                        "IpProtocol": "tcp",
                        "FromPort": profile.port,
                        "ToPort": profile.port,
                        "SourceSecurityGroupId": config.alb_security_group.import(),
                        "Description": "Load balancer to target",
                    },
                ],
                "SecurityGroupEgress": [{ "IpProtocol": "-1", "CidrIp": "0.0.0.0/0" }],
            }),
        ))?;

        let alb_target_group = scope.add(Resource::new(
            "AlbTargetGroup",
            "AWS::ElasticLoadBalancingV2::TargetGroup",
            json!({
                "Name": profile.alb_target_group(),
                "Port": profile.port,
                "Protocol": "HTTP",
                "TargetType": "ip",
                "VpcId": config.vpc_id.import(),
                "HealthCheckEnabled": true,
                "HealthCheckPath": HEALTH_CHECK_PATH,
                "HealthCheckPort": profile.port.to_string(),
                "HealthCheckIntervalSeconds": HEALTH_CHECK_INTERVAL_SECS,
                "HealthCheckTimeoutSeconds": HEALTH_CHECK_TIMEOUT_SECS,
                "TargetGroupAttributes": [{
                    "Key": "deregistration_delay.timeout_seconds",
                    "Value": DEREGISTRATION_DELAY_SECS.to_string(),
                }],
            }),
        ))?;
        let alb_listener = scope.add(Resource::new(
            "AlbListener",
            "AWS::ElasticLoadBalancingV2::Listener",
            json!({
                "LoadBalancerArn": config.alb_arn.import(),
                "Port": profile.port,
                "Protocol": "HTTP",
                "DefaultActions": [{ "Type": "forward", "TargetGroupArn": reference(&alb_target_group) }],
            }),
        ))?;

        let nlb_target_group = scope.add(Resource::new(
            "NlbTargetGroup",
            "AWS::ElasticLoadBalancingV2::TargetGroup",
            json!({
                "Name": profile.nlb_target_group(),
                "Port": profile.port,
                "Protocol": "TCP",
                "TargetType": "ip",
                "VpcId": config.vpc_id.import(),
            }),
        ))?;
        let nlb_listener = scope.add(Resource::new(
            "NlbListener",
            "AWS::ElasticLoadBalancingV2::Listener",
            json!({
                "LoadBalancerArn": config.nlb_arn.import(),
                "Port": profile.port,
                "Protocol": "TCP",
                "DefaultActions": [{ "Type": "forward", "TargetGroupArn": reference(&nlb_target_group) }],
            }),
        ))?;

        let service = scope.add(
            Resource::new(
                "Service",
                "AWS::ECS::Service",
                json!({
                    "ServiceName": profile.display_name,
                    "Cluster": config.cluster_name.import(),
                    "TaskDefinition": reference(&task_definition),
                    "DesiredCount": DESIRED_COUNT,
                    "LaunchType": "FARGATE",
                    "HealthCheckGracePeriodSeconds": 60,
                    "DeploymentConfiguration": {
                        "MaximumPercent": 200,
                        "MinimumHealthyPercent": 50,
                    },
                    "NetworkConfiguration": {
                        "AwsvpcConfiguration": {
                            "AssignPublicIp": "ENABLED",
                            "SecurityGroups": [get_att(&security_group, "GroupId")],
                            "Subnets": config.subnets.import_list(),
                        },
                    },
                    "LoadBalancers": [
                        {
                            "ContainerName": profile.container_name,
                            "ContainerPort": profile.port,
                            "TargetGroupArn": reference(&alb_target_group),
                        },
                        {
                            "ContainerName": profile.container_name,
                            "ContainerPort": profile.port,
                            "TargetGroupArn": reference(&nlb_target_group),
                        },
                    ],
                }),
            )
            .depends_on(&alb_listener)
            .depends_on(&nlb_listener),
        )?;

        if let Some(scaling) = profile.scaling {
            scope.add(
                Resource::new(
                    "ScalableTarget",
                    "AWS::ApplicationAutoScaling::ScalableTarget",
                    json!({
                        "MinCapacity": scaling.min,
                        "MaxCapacity": scaling.max,
                        "ResourceId": join("/", vec![
                            json!("service"),
                            config.cluster_name.import(),
                            get_att(&service, "Name"),
                        ]),
                        "RoleARN": join("", vec![
                            json!("arn:"),
                            partition(),
                            json!(":iam::"),
                            account_id(),
                            json!(":role/aws-service-role/ecs.application-autoscaling.amazonaws.com/AWSServiceRoleForApplicationAutoScaling_ECSService"),
                        ]),
                        "ScalableDimension": "ecs:service:DesiredCount",
                        "ServiceNamespace": "ecs",
                    }),
                )
                .depends_on(&service),
            )?;
        }

        let events_topic = match &workload.events_topic {
            Some(topic) => Some(scope.export("EventsTopicArn", reference(topic))?),
            None => None,
        };

        Ok(ServiceOutputs {
            kind: self.kind,
            service_name: scope.export("ServiceName", get_att(&service, "Name"))?,
            events_topic,
        })
    }
}

impl ServiceStack {
    fn validate(&self, scope: &StackScope, profile: &ServiceProfile) -> Result<(), DomainError> {
        let stack = scope.id();

        TASK_SIZE.validate(stack)?;
        DomainValidator::validate_port(stack, "container port", profile.port)?;
        DomainValidator::validate_retention(stack, LOG_RETENTION_DAYS)?;
        DomainValidator::validate_range(
            stack,
            "health check interval",
            HEALTH_CHECK_INTERVAL_SECS,
            5,
            300,
        )?;
        DomainValidator::validate_range(
            stack,
            "health check timeout",
            HEALTH_CHECK_TIMEOUT_SECS,
            2,
            HEALTH_CHECK_INTERVAL_SECS - 1,
        )?;
        DomainValidator::validate_range(
            stack,
            "deregistration delay",
            DEREGISTRATION_DELAY_SECS,
            0,
            3600,
        )?;

        for (resource, name) in [
            ("AlbTargetGroup", profile.alb_target_group()),
            ("NlbTargetGroup", profile.nlb_target_group()),
        ] {
            DomainValidator::validate_name(stack, resource, &name, NameRule::TargetGroup)?;
        }
        for (resource, name) in [
            ("LogGroup", profile.display_name.to_string()),
            ("XRayLogGroup", profile.xray_name()),
        ] {
            DomainValidator::validate_name(stack, resource, &name, NameRule::LogGroup)?;
        }

        if let Some(scaling) = profile.scaling {
            DomainValidator::validate_range(stack, "min capacity", scaling.min, 1, scaling.max)?;
            DomainValidator::validate_range(
                stack,
                "desired count",
                DESIRED_COUNT,
                scaling.min,
                scaling.max,
            )?;
        }

        Ok(())
    }
}

// ── Workload resources ───────────────────────────────────────────────────────

fn products_workload(scope: &mut StackScope) -> Result<Workload, DomainError> {
    DomainValidator::validate_name(scope.id(), "ProductEventsTopic", "products-events", NameRule::Topic)?;
    DomainValidator::validate_name(scope.id(), "ProductsDdb", "products", NameRule::Table)?;

    let topic = scope.add(Resource::new(
        "ProductEventsTopic",
        "AWS::SNS::Topic",
        json!({
            "TopicName": "products-events",
            "DisplayName": "Product events topic",
        }),
    ))?;

    let table = scope.add(
        Resource::new(
            "ProductsDdb",
            "AWS::DynamoDB::Table",
            json!({
                "TableName": "products",
                "AttributeDefinitions": [
                    { "AttributeName": "id", "AttributeType": "S" },
                    { "AttributeName": "code", "AttributeType": "S" },
                ],
                "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
                "ProvisionedThroughput": provisioned(1, 1),
                "GlobalSecondaryIndexes": [{
                    "IndexName": "codeIdx",
                    "KeySchema": [{ "AttributeName": "code", "KeyType": "HASH" }],
                    "Projection": { "ProjectionType": "KEYS_ONLY" },
                    "ProvisionedThroughput": provisioned(1, 1),
                }],
            }),
        )
        .deletion_policy(DeletionPolicy::Delete),
    )?;

    Ok(Workload {
        environment: vec![
            ("AWS_PRODUCTSDDB_NAME", reference(&table)),
            ("AWS_SNS_TOPIC_PRODUCT_EVENTS", reference(&topic)),
        ],
        statements: vec![
            table_read_write(&table),
            json!({ "Effect": "Allow", "Action": "sns:Publish", "Resource": reference(&topic) }),
        ],
        events_topic: Some(topic),
    })
}

fn audit_workload(scope: &mut StackScope, topic: &OutputRef) -> Result<Workload, DomainError> {
    let stack = scope.id().clone();
    DomainValidator::validate_name(&stack, "EventsDdb", "events", NameRule::Table)?;
    DomainValidator::validate_range(&stack, "DLQ retention", DLQ_RETENTION_SECS, 60, 1_209_600)?;
    DomainValidator::validate_range(&stack, "max receive count", MAX_RECEIVE_COUNT, 1, 1000)?;

    let table = scope.add(
        Resource::new(
            "EventsDdb",
            "AWS::DynamoDB::Table",
            json!({
                "TableName": "events",
                "AttributeDefinitions": [
                    { "AttributeName": "pk", "AttributeType": "S" },
                    { "AttributeName": "sk", "AttributeType": "S" },
                ],
                "KeySchema": [
                    { "AttributeName": "pk", "KeyType": "HASH" },
                    { "AttributeName": "sk", "KeyType": "RANGE" },
                ],
                "TimeToLiveSpecification": { "AttributeName": "ttl", "Enabled": true },
                "ProvisionedThroughput": provisioned(1, 1),
            }),
        )
        .deletion_policy(DeletionPolicy::Delete),
    )?;

    DomainValidator::validate_name(&stack, "ProductEventsDlq", "product-events-dlq", NameRule::Queue)?;
    let dlq = scope.add(
        Resource::new(
            "ProductEventsDlq",
            "AWS::SQS::Queue",
            json!({
                "QueueName": "product-events-dlq",
                "MessageRetentionPeriod": DLQ_RETENTION_SECS,
            }),
        )
        .deletion_policy(DeletionPolicy::Delete),
    )?;

    let events = subscribed_queue(
        scope,
        "ProductEventsQueue",
        "product-events",
        &dlq,
        topic,
        &["PRODUCT_CREATED", "PRODUCT_UPDATED", "PRODUCT_DELETED"],
    )?;
    let failures = subscribed_queue(
        scope,
        "ProductFailureEventsQueue",
        "product-failure-events",
        &dlq,
        topic,
        &["PRODUCT_FAILURE"],
    )?;

    Ok(Workload {
        environment: vec![
            ("AWS_SQS_QUEUE_PRODUCT_EVENTS_URL", reference(&events)),
            ("AWS_SQS_QUEUE_PRODUCT_FAILURE_EVENTS_URL", reference(&failures)),
            ("AWS_EVENTS_DDB", reference(&table)),
        ],
        statements: vec![
            json!({
                "Effect": "Allow",
                "Action": [
                    "sqs:ReceiveMessage",
                    "sqs:ChangeMessageVisibility",
                    "sqs:GetQueueUrl",
                    "sqs:DeleteMessage",
                    "sqs:GetQueueAttributes",
                ],
                "Resource": [get_att(&events, "Arn"), get_att(&failures, "Arn")],
            }),
            table_read_write(&table),
        ],
        events_topic: None,
    })
}

/// A queue redriving to `dlq`, subscribed to `topic` for the given event types.
fn subscribed_queue(
    scope: &mut StackScope,
    logical_id: &str,
    name: &str,
    dlq: &LogicalId,
    topic: &OutputRef,
    event_types: &[&str],
) -> Result<LogicalId, DomainError> {
    DomainValidator::validate_name(scope.id(), logical_id, name, NameRule::Queue)?;

    let queue = scope.add(
        Resource::new(
            logical_id,
            "AWS::SQS::Queue",
            json!({
                "QueueName": name,
                "RedrivePolicy": {
                    "deadLetterTargetArn": get_att(dlq, "Arn"),
                    "maxReceiveCount": MAX_RECEIVE_COUNT,
                },
            }),
        )
        .deletion_policy(DeletionPolicy::Delete),
    )?;

    scope.add(Resource::new(
        format!("{logical_id}Policy"),
        "AWS::SQS::QueuePolicy",
        json!({
            "Queues": [reference(&queue)],
            "PolicyDocument": policy_document(vec![json!({
                "Effect": "Allow",
                "Principal": { "Service": "sns.amazonaws.com" },
                "Action": "sqs:SendMessage",
                "Resource": get_att(&queue, "Arn"),
                "Condition": { "ArnEquals": { "aws:SourceArn": topic.import() } },
            })]),
        }),
    ))?;

    scope.add(Resource::new(
        format!("{logical_id}Subscription"),
        "AWS::SNS::Subscription",
        json!({
            "Protocol": "sqs",
            "TopicArn": topic.import(),
            "Endpoint": get_att(&queue, "Arn"),
            "FilterPolicy": { "eventType": event_types },
        }),
    ))?;

    Ok(queue)
}

// ── IAM and property helpers ─────────────────────────────────────────────────

fn assume_role(service: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole",
        }],
    })
}

fn policy_document(statements: Vec<Value>) -> Value {
    json!({ "Version": "2012-10-17", "Statement": statements })
}

fn table_read_write(table: &LogicalId) -> Value {
    json!({
        "Effect": "Allow",
        "Action": [
            "dynamodb:BatchGetItem",
            "dynamodb:GetRecords",
            "dynamodb:GetShardIterator",
            "dynamodb:Query",
            "dynamodb:GetItem",
            "dynamodb:Scan",
            "dynamodb:ConditionCheckItem",
            "dynamodb:BatchWriteItem",
            "dynamodb:PutItem",
            "dynamodb:UpdateItem",
            "dynamodb:DeleteItem",
            "dynamodb:DescribeTable",
        ],
        "Resource": [
            get_att(table, "Arn"),
            join("", vec![get_att(table, "Arn"), json!("/index/*")]),
        ],
    })
}

fn provisioned(read: u32, write: u32) -> Value {
    json!({ "ReadCapacityUnits": read, "WriteCapacityUnits": write })
}

fn aws_logs(log_group: &LogicalId, prefix: &str, region: &str) -> Value {
    json!({
        "LogDriver": "awslogs",
        "Options": {
            "awslogs-group": reference(log_group),
            "awslogs-stream-prefix": prefix,
            "awslogs-region": region,
        },
    })
}
