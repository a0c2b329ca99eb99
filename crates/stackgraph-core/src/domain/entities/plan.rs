use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{ServiceKind, StackId, StackKind, Tags},
};

/// One stack in a construction plan: what to build and what it waits for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    id: StackId,
    kind: StackKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<StackId>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    tags: Tags,
}

impl PlanEntry {
    pub fn new(id: StackId, kind: StackKind) -> Self {
        Self {
            id,
            kind,
            depends_on: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Add a dependency edge. Repeated edges are ignored.
    pub fn depends_on(mut self, dependency: StackId) -> Self {
        if !self.depends_on.contains(&dependency) {
            self.depends_on.push(dependency);
        }
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn id(&self) -> &StackId {
        &self.id
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    pub fn dependencies(&self) -> &[StackId] {
        &self.depends_on
    }

    /// Tags applied to this stack on top of the deployment-wide tags.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// The declared stacks of one run and their dependency edges.
///
/// Declaration order matters: it breaks ties when several stacks are
/// ready to be built at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPlan {
    #[serde(rename = "stack", default)]
    entries: Vec<PlanEntry>,
}

impl ConstructionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: PlanEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn get(&self, id: &StackId) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of this plan without the named stacks.
    ///
    /// Edges of the remaining stacks are kept as declared, so removing a
    /// stack that others still depend on surfaces as an unknown dependency.
    pub fn without(&self, ids: &[&str]) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| !ids.contains(&e.id().as_str()))
                .cloned()
                .collect(),
        }
    }

    /// The e-commerce platform: registry and network at the bottom, the
    /// cluster and load balancers on the network, three services on top,
    /// and the REST API fronting the network load balancer.
    pub fn canonical() -> Result<Self, DomainError> {
        let id = |value: &str| StackId::new(value);
        let cost = |value: &str| Tags::new().with("cost", value);

        let ecr = id("Ecr")?;
        let vpc = id("Vpc")?;
        let cluster = id("Cluster")?;
        let nlb = id("Nlb")?;
        let products = id("ProductsService")?;

        let service = |name: &str, kind: ServiceKind, consumes_products: bool, tag: &str| {
            let mut entry = PlanEntry::new(id(name)?, StackKind::Service(kind))
                .depends_on(vpc.clone())
                .depends_on(cluster.clone())
                .depends_on(nlb.clone())
                .depends_on(ecr.clone())
                .with_tags(cost(tag)?);
            if consumes_products {
                entry = entry.depends_on(products.clone());
            }
            Ok::<_, DomainError>(entry)
        };

        Ok(Self::new()
            .with_entry(PlanEntry::new(ecr.clone(), StackKind::Registry))
            .with_entry(PlanEntry::new(vpc.clone(), StackKind::Network))
            .with_entry(PlanEntry::new(cluster.clone(), StackKind::Cluster).depends_on(vpc.clone()))
            .with_entry(PlanEntry::new(nlb.clone(), StackKind::LoadBalancer).depends_on(vpc.clone()))
            .with_entry(service("ProductsService", ServiceKind::Products, false, "ProductsServiceInfra")?)
            .with_entry(service("AuditService", ServiceKind::Audit, true, "AuditServiceInfra")?)
            .with_entry(service("InvoicesService", ServiceKind::Invoices, true, "InvoicesServiceInfra")?)
            .with_entry(PlanEntry::new(id("Api")?, StackKind::Gateway).depends_on(nlb.clone())))
    }
}
