use serde_json::{Map, Value, json};

use crate::domain::{
    entities::{DeletionPolicy, DependencyOutputs, GatewayOutputs, OutputRef, Resource, StackScope},
    error::DomainError,
    intrinsics::{get_att, join, managed_policy_arn, reference, region, url_suffix},
    profiles::{self, LOG_RETENTION_DAYS},
    validation::{DomainValidator, NameRule},
    value_objects::{LogicalId, ServiceKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub nlb_dns_name: OutputRef,
    pub vpc_link: OutputRef,
}

/// One proxied method of the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// API Gateway resource path.
    pub path: &'static str,
    pub method: &'static str,
    /// Path on the products service behind the network load balancer.
    pub backend_path: &'static str,
}

impl Route {
    fn has_id(&self) -> bool {
        self.path.ends_with("{id}")
    }

    fn logical_id(&self) -> String {
        let resource = if self.has_id() { "ProductId" } else { "Products" };
        let method = self.method.to_ascii_lowercase();
        let mut chars = method.chars();
        let method = match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        format!("{resource}{method}Method")
    }
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/products",
        method: "GET",
        backend_path: "/api/products",
    },
    Route {
        path: "/products",
        method: "POST",
        backend_path: "/api/products",
    },
    Route {
        path: "/products/{id}",
        method: "PUT",
        backend_path: "/api/products/{id}",
    },
    Route {
        path: "/products/{id}",
        method: "GET",
        backend_path: "/api/products/{id}",
    },
    Route {
        path: "/products/{id}",
        method: "DELETE",
        backend_path: "/api/products/{id}",
    },
];

const ACCESS_LOG_FORMAT: &str = concat!(
    r#"{"requestId":"$context.requestId","ip":"$context.identity.sourceIp","#,
    r#""user":"$context.identity.user","caller":"$context.identity.caller","#,
    r#""requestTime":"$context.requestTime","httpMethod":"$context.httpMethod","#,
    r#""resourcePath":"$context.resourcePath","status":"$context.status","#,
    r#""protocol":"$context.protocol","responseLength":"$context.responseLength"}"#,
);

/// REST API fronting the products service through the VPC link.
pub struct GatewayStack;

impl GatewayStack {
    pub const API_NAME: &'static str = "ECommerceAPI";
    pub const STAGE: &'static str = "prod";
}

impl super::StackUnit for GatewayStack {
    type Config = GatewayConfig;
    type Outputs = GatewayOutputs;

    fn wire(&self, deps: &DependencyOutputs<'_>) -> Result<GatewayConfig, DomainError> {
        let load_balancer = deps.load_balancer("vpc_link")?;
        Ok(GatewayConfig {
            nlb_dns_name: load_balancer.nlb_dns_name.clone(),
            vpc_link: load_balancer.vpc_link.clone(),
        })
    }

    fn construct(
        &self,
        scope: &mut StackScope,
        config: GatewayConfig,
    ) -> Result<GatewayOutputs, DomainError> {
        DomainValidator::validate_name(scope.id(), "ApiLogGroup", Self::API_NAME, NameRule::LogGroup)?;
        DomainValidator::validate_retention(scope.id(), LOG_RETENTION_DAYS)?;
        scope.set_description("REST API of the e-commerce platform");

        let log_group = scope.add(
            Resource::new(
                "ApiLogGroup",
                "AWS::Logs::LogGroup",
                json!({ "LogGroupName": Self::API_NAME, "RetentionInDays": LOG_RETENTION_DAYS }),
            )
            .deletion_policy(DeletionPolicy::Delete),
        )?;

        let rest_api = scope.add(Resource::new(
            "RestApi",
            "AWS::ApiGateway::RestApi",
            json!({ "Name": Self::API_NAME }),
        ))?;

        let cloudwatch_role = scope.add(Resource::new(
            "CloudWatchRole",
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "apigateway.amazonaws.com" },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [managed_policy_arn(
                    "service-role/AmazonAPIGatewayPushToCloudWatchLogs"
                )],
            }),
        ))?;
        let account = scope.add(
            Resource::new(
                "Account",
                "AWS::ApiGateway::Account",
                json!({ "CloudWatchRoleArn": get_att(&cloudwatch_role, "Arn") }),
            )
            .depends_on(&rest_api),
        )?;

        let products = scope.add(Resource::new(
            "ProductsResource",
            "AWS::ApiGateway::Resource",
            json!({
                "ParentId": get_att(&rest_api, "RootResourceId"),
                "PathPart": "products",
                "RestApiId": reference(&rest_api),
            }),
        ))?;
        let product_id = scope.add(Resource::new(
            "ProductIdResource",
            "AWS::ApiGateway::Resource",
            json!({
                "ParentId": reference(&products),
                "PathPart": "{id}",
                "RestApiId": reference(&rest_api),
            }),
        ))?;

        let backend_port = profiles::profile(ServiceKind::Products).port;
        let mut methods = Vec::with_capacity(ROUTES.len());
        for route in ROUTES {
            let resource = if route.has_id() { &product_id } else { &products };
            methods.push(scope.add(Resource::new(
                route.logical_id(),
                "AWS::ApiGateway::Method",
                method_properties(route, &rest_api, resource, &config, backend_port),
            ))?);
        }

        let deployment = methods.iter().fold(
            Resource::new(
                "Deployment",
                "AWS::ApiGateway::Deployment",
                json!({
                    "RestApiId": reference(&rest_api),
                    "Description": "Automatically created by stackgraph",
                }),
            ),
            |resource, method| resource.depends_on(method),
        );
        let deployment = scope.add(deployment)?;

        scope.add(
            Resource::new(
                "DeploymentStage",
                "AWS::ApiGateway::Stage",
                json!({
                    "RestApiId": reference(&rest_api),
                    "DeploymentId": reference(&deployment),
                    "StageName": Self::STAGE,
                    "AccessLogSetting": {
                        "DestinationArn": get_att(&log_group, "Arn"),
                        "Format": ACCESS_LOG_FORMAT,
                    },
                    "MethodSettings": [{
                        "ResourcePath": "/*",
                        "HttpMethod": "*",
                        "LoggingLevel": "INFO",
                        "DataTraceEnabled": false,
                    }],
                }),
            )
            .depends_on(&account),
        )?;

        Ok(GatewayOutputs {
            rest_api_id: scope.export("RestApiId", reference(&rest_api))?,
            api_url: scope.export(
                "ApiUrl",
                join("", vec![
                    json!("https://"),
                    reference(&rest_api),
                    json!(".execute-api."),
                    region(),
                    json!("."),
                    url_suffix(),
                    json!(format!("/{}/", Self::STAGE)),
                ]),
            )?,
        })
    }
}

fn method_properties(
    route: &Route,
    rest_api: &LogicalId,
    resource: &LogicalId,
    config: &GatewayConfig,
    backend_port: u16,
) -> Value {
    let mut method_parameters = Map::new();
    let mut integration_parameters = Map::new();
    if route.has_id() {
        method_parameters.insert("method.request.path.id".into(), json!(true));
        integration_parameters.insert(
            "integration.request.path.id".into(),
            json!("method.request.path.id"),
        );
    }
    method_parameters.insert("method.request.header.requestId".into(), json!(false));
    integration_parameters.insert(
        "integration.request.header.requestId".into(),
        json!("context.requestId"),
    );

    json!({
        "RestApiId": reference(rest_api),
        "ResourceId": reference(resource),
        "HttpMethod": route.method,
        "AuthorizationType": "NONE",
        "RequestParameters": method_parameters,
        "Integration": {
            "Type": "HTTP_PROXY",
            "IntegrationHttpMethod": route.method,
            "Uri": join("", vec![
                json!("http://"),
                config.nlb_dns_name.import(),
                json!(format!(":{backend_port}{}", route.backend_path)),
            ]),
            "ConnectionType": "VPC_LINK",
            "ConnectionId": config.vpc_link.import(),
            "RequestParameters": integration_parameters,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_logical_ids_are_alphanumeric() {
        let ids: Vec<String> = ROUTES.iter().map(Route::logical_id).collect();
        assert_eq!(
            ids,
            [
                "ProductsGetMethod",
                "ProductsPostMethod",
                "ProductIdPutMethod",
                "ProductIdGetMethod",
                "ProductIdDeleteMethod"
            ]
        );
    }
}
