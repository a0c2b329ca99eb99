use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{
    entities::{outputs::OutputRef, plan::PlanEntry},
    error::DomainError,
    value_objects::{DeploymentEnvironment, LogicalId, StackId, StackKind, Tags},
};

/// What CloudFormation does with a resource when it leaves the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
}

impl DeletionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "Delete",
        }
    }
}

/// A resource declaration before it is placed in a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    logical_id: String,
    resource_type: &'static str,
    properties: Value,
    depends_on: Vec<LogicalId>,
    deletion_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, resource_type: &'static str, properties: Value) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type,
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
        }
    }

    pub fn depends_on(mut self, id: &LogicalId) -> Self {
        self.depends_on.push(id.clone());
        self
    }

    pub fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }
}

/// A resource placed in a stack, with a validated logical id.
#[derive(Debug, Clone, PartialEq)]
pub struct StackResource {
    pub logical_id: LogicalId,
    pub resource_type: &'static str,
    pub properties: Value,
    pub depends_on: Vec<LogicalId>,
    pub deletion_policy: Option<DeletionPolicy>,
}

/// One exported value of a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub output: OutputRef,
    pub value: Value,
}

/// A fully constructed stack. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StackDefinition {
    id: StackId,
    kind: StackKind,
    description: String,
    environment: DeploymentEnvironment,
    tags: Tags,
    dependencies: Vec<StackId>,
    resources: Vec<StackResource>,
    outputs: Vec<StackOutput>,
}

impl StackDefinition {
    pub fn id(&self) -> &StackId {
        &self.id
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn environment(&self) -> &DeploymentEnvironment {
        &self.environment
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn dependencies(&self) -> &[StackId] {
        &self.dependencies
    }

    pub fn resources(&self) -> &[StackResource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn resource(&self, logical_id: &str) -> Option<&StackResource> {
        self.resources
            .iter()
            .find(|r| r.logical_id.as_str() == logical_id)
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.output.name()).collect()
    }

    /// Check the invariants a template needs: at least one resource, unique
    /// logical ids and output names, and intra-stack `DependsOn` edges that
    /// point at declared resources.
    pub fn validate(&self) -> Result<(), DomainError> {
        let stack = self.id.to_string();

        if self.resources.is_empty() {
            return Err(DomainError::EmptyStack { stack });
        }

        let mut ids = HashSet::new();
        for resource in &self.resources {
            if !ids.insert(resource.logical_id.as_str()) {
                return Err(DomainError::DuplicateLogicalId {
                    stack,
                    id: resource.logical_id.to_string(),
                });
            }
        }

        for resource in &self.resources {
            if let Some(missing) = resource
                .depends_on
                .iter()
                .find(|dep| !ids.contains(dep.as_str()))
            {
                return Err(DomainError::DanglingResourceDependency {
                    stack,
                    resource: resource.logical_id.to_string(),
                    dependency: missing.to_string(),
                });
            }
        }

        let mut names = HashSet::new();
        for output in &self.outputs {
            if !names.insert(output.output.name()) {
                return Err(DomainError::DuplicateOutput {
                    stack,
                    output: output.output.name().to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Deployment-wide settings every stack inherits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentSettings {
    pub environment: DeploymentEnvironment,
    pub tags: Tags,
}

/// Mutable construction context of one stack.
///
/// Stack units declare resources and exports through the scope; `finish`
/// freezes it into a validated `StackDefinition`.
#[derive(Debug)]
pub struct StackScope {
    id: StackId,
    kind: StackKind,
    environment: DeploymentEnvironment,
    tags: Tags,
    dependencies: Vec<StackId>,
    description: String,
    resources: Vec<StackResource>,
    outputs: Vec<StackOutput>,
}

impl StackScope {
    pub fn new(entry: &PlanEntry, settings: &DeploymentSettings) -> Self {
        Self {
            id: entry.id().clone(),
            kind: entry.kind(),
            environment: settings.environment.clone(),
            tags: settings.tags.merged(entry.tags()),
            dependencies: entry.dependencies().to_vec(),
            description: format!("{} ({})", entry.id(), entry.kind()),
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn id(&self) -> &StackId {
        &self.id
    }

    pub fn environment(&self) -> &DeploymentEnvironment {
        &self.environment
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Place a resource in the stack and return its logical id.
    pub fn add(&mut self, resource: Resource) -> Result<LogicalId, DomainError> {
        let logical_id = LogicalId::new(&self.id, resource.logical_id)?;

        if self.resources.iter().any(|r| r.logical_id == logical_id) {
            return Err(DomainError::DuplicateLogicalId {
                stack: self.id.to_string(),
                id: logical_id.to_string(),
            });
        }

        self.resources.push(StackResource {
            logical_id: logical_id.clone(),
            resource_type: resource.resource_type,
            properties: resource.properties,
            depends_on: resource.depends_on,
            deletion_policy: resource.deletion_policy,
        });
        Ok(logical_id)
    }

    /// Export `value` as `<StackId>:<name>`.
    pub fn export(&mut self, name: &str, value: Value) -> Result<OutputRef, DomainError> {
        let output = OutputRef::new(self.id.clone(), name);

        if !name.starts_with(|c: char| c.is_ascii_alphabetic())
            || !name.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DomainError::InvalidLogicalId {
                stack: self.id.to_string(),
                id: name.to_string(),
                reason: "output names must be alphanumeric".to_string(),
            });
        }
        if self.outputs.iter().any(|o| o.output == output) {
            return Err(DomainError::DuplicateOutput {
                stack: self.id.to_string(),
                output: name.to_string(),
            });
        }

        self.outputs.push(StackOutput {
            output: output.clone(),
            value,
        });
        Ok(output)
    }

    pub fn finish(self) -> Result<StackDefinition, DomainError> {
        let definition = StackDefinition {
            id: self.id,
            kind: self.kind,
            description: self.description,
            environment: self.environment,
            tags: self.tags,
            dependencies: self.dependencies,
            resources: self.resources,
            outputs: self.outputs,
        };
        definition.validate()?;
        Ok(definition)
    }
}
