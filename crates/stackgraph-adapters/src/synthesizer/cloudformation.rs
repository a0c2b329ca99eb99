//! CloudFormation JSON synthesizer.
//!
//! Each stack becomes one template:
//!
//! ```json
//! {
//!   "AWSTemplateFormatVersion": "2010-09-09",
//!   "Description": "...",
//!   "Resources": { "<LogicalId>": { "Type": "...", "Properties": {}, "DependsOn": [] } },
//!   "Outputs": { "<Name>": { "Value": {}, "Export": { "Name": "<Stack>:<Name>" } } }
//! }
//! ```
//!
//! The manifest lists one `aws:cloudformation:stack` artifact per template,
//! in construction order.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use stackgraph_core::{
    application::{
        ApplicationError,
        ports::{SynthesizedTemplate, TemplateSynthesizer},
    },
    domain::{Assembly, DomainValidator, StackDefinition, StackResource},
    error::StackgraphResult,
};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Renders stacks as pretty-printed CloudFormation JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudFormationSynthesizer;

impl CloudFormationSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// The template document of `stack`, without validation.
    pub fn template(&self, stack: &StackDefinition) -> Value {
        let resources: Map<String, Value> = stack
            .resources()
            .iter()
            .map(|r| (r.logical_id.to_string(), resource(r)))
            .collect();

        let mut template = Map::new();
        template.insert("AWSTemplateFormatVersion".into(), json!(TEMPLATE_FORMAT_VERSION));
        template.insert("Description".into(), json!(stack.description()));
        template.insert("Resources".into(), Value::Object(resources));

        if !stack.outputs().is_empty() {
            let outputs: Map<String, Value> = stack
                .outputs()
                .iter()
                .map(|o| {
                    (
                        o.output.name().to_string(),
                        json!({
                            "Value": o.value,
                            "Export": { "Name": o.output.export_name() },
                        }),
                    )
                })
                .collect();
            template.insert("Outputs".into(), Value::Object(outputs));
        }

        Value::Object(template)
    }
}

fn resource(resource: &StackResource) -> Value {
    let mut body = Map::new();
    body.insert("Type".into(), json!(resource.resource_type));

    let has_properties = resource
        .properties
        .as_object()
        .is_none_or(|props| !props.is_empty());
    if has_properties {
        body.insert("Properties".into(), resource.properties.clone());
    }

    if !resource.depends_on.is_empty() {
        let depends_on: Vec<&str> = resource.depends_on.iter().map(|id| id.as_str()).collect();
        body.insert("DependsOn".into(), json!(depends_on));
    }

    if let Some(policy) = resource.deletion_policy {
        body.insert("DeletionPolicy".into(), json!(policy.as_str()));
        body.insert("UpdateReplacePolicy".into(), json!(policy.as_str()));
    }

    Value::Object(body)
}

fn to_pretty_json<T: Serialize>(stack: &str, value: &T) -> StackgraphResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::SynthesisFailed {
            stack: stack.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl TemplateSynthesizer for CloudFormationSynthesizer {
    #[instrument(skip_all, fields(stack = %stack.id()))]
    fn synthesize(&self, stack: &StackDefinition) -> StackgraphResult<SynthesizedTemplate> {
        DomainValidator::validate_stack(stack)?;

        let body = to_pretty_json(stack.id().as_str(), &self.template(stack))?;
        debug!(
            resources = stack.resources().len(),
            outputs = stack.outputs().len(),
            "Synthesized CloudFormation template"
        );

        Ok(SynthesizedTemplate {
            stack: stack.id().clone(),
            body,
        })
    }

    fn manifest(
        &self,
        assembly: &Assembly,
        templates: &[SynthesizedTemplate],
    ) -> StackgraphResult<String> {
        let environment = assembly.environment().uri();

        let mut artifacts = Map::new();
        for template in templates {
            let stack = assembly
                .get(template.stack.as_str())
                .ok_or_else(|| ApplicationError::SynthesisFailed {
                    stack: template.stack.to_string(),
                    reason: "template does not belong to the assembly".into(),
                })?;
            let definition = &stack.definition;

            let tags: Map<String, Value> = definition
                .tags()
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect();
            let dependencies: Vec<&str> = definition
                .dependencies()
                .iter()
                .map(|d| d.as_str())
                .collect();

            artifacts.insert(
                template.stack.to_string(),
                json!({
                    "type": "aws:cloudformation:stack",
                    "environment": environment,
                    "properties": {
                        "templateFile": template.file_name(),
                        "stackName": definition.id().as_str(),
                        "tags": tags,
                    },
                    "dependencies": dependencies,
                }),
            );
        }

        let manifest = json!({
            "version": MANIFEST_VERSION,
            "environment": environment,
            "artifacts": artifacts,
        });
        to_pretty_json("manifest", &manifest)
    }
}
