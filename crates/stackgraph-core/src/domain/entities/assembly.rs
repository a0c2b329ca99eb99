use crate::domain::{
    entities::{outputs::StackOutputs, stack::StackDefinition},
    value_objects::{DeploymentEnvironment, StackId},
};

/// A stack together with the typed outputs it handed to its dependents.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructedStack {
    pub definition: StackDefinition,
    pub outputs: StackOutputs,
}

impl ConstructedStack {
    pub fn id(&self) -> &StackId {
        self.definition.id()
    }
}

/// Every stack of one run, in construction order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    environment: DeploymentEnvironment,
    stacks: Vec<ConstructedStack>,
}

impl Assembly {
    pub fn new(environment: DeploymentEnvironment) -> Self {
        Self {
            environment,
            stacks: Vec::new(),
        }
    }

    pub fn push(&mut self, stack: ConstructedStack) {
        self.stacks.push(stack);
    }

    pub fn environment(&self) -> &DeploymentEnvironment {
        &self.environment
    }

    pub fn stacks(&self) -> &[ConstructedStack] {
        &self.stacks
    }

    pub fn get(&self, id: &str) -> Option<&ConstructedStack> {
        self.stacks.iter().find(|s| s.id().as_str() == id)
    }

    /// Stack ids in construction order.
    pub fn order(&self) -> Vec<&StackId> {
        self.stacks.iter().map(ConstructedStack::id).collect()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
