//! Service profile registry.
//!
//! Each workload is described exactly once by its [`ServiceProfile`]; the
//! service stack reads everything kind-specific from here. Fargate sizing
//! and the X-Ray sidecar are shared by all workloads.
//!
//! # Adding a New Service
//!
//! 1. Add a variant to `ServiceKind` in `value_objects.rs`
//! 2. Add one [`ServiceProfile`] entry to [`SERVICE_PROFILES`]

use crate::domain::{
    error::DomainError,
    validation::DomainValidator,
    value_objects::{ServiceKind, StackId},
};

/// Who may reach the service port directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressScope {
    Anywhere,
    VpcCidr,
}

/// Desired-count bounds for application auto scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceProfile {
    pub kind: ServiceKind,

    /// PascalCase name used for the ECS service, log groups and logical ids.
    pub display_name: &'static str,

    pub container_name: &'static str,

    pub repository_name: &'static str,

    /// Task definition family.
    pub family: &'static str,

    pub image_tag: &'static str,

    pub port: u16,

    /// `AWS_XRAY_TRACING_NAME` of the container.
    pub tracing_name: &'static str,

    pub ingress: IngressScope,

    pub scaling: Option<ScalingRange>,

    /// Needs the product events topic from one of its dependencies.
    pub consumes_events: bool,
}

impl ServiceProfile {
    pub fn alb_target_group(&self) -> String {
        format!("{}Alb", self.container_name)
    }

    pub fn nlb_target_group(&self) -> String {
        format!("{}Nlb", self.container_name)
    }

    pub fn xray_name(&self) -> String {
        format!("XRay{}", self.display_name)
    }
}

pub static SERVICE_PROFILES: [ServiceProfile; 3] = [
    ServiceProfile {
        kind: ServiceKind::Products,
        display_name: "ProductsService",
        container_name: "productsService",
        repository_name: "productsservice",
        family: "products-service",
        image_tag: "1.8.0",
        port: 8080,
        tracing_name: "productsservice",
        ingress: IngressScope::Anywhere,
        scaling: None,
        consumes_events: false,
    },
    ServiceProfile {
        kind: ServiceKind::Audit,
        display_name: "AuditService",
        container_name: "auditService",
        repository_name: "auditservice",
        family: "audit-service",
        image_tag: "1.4.0",
        port: 9090,
        tracing_name: "auditservice",
        ingress: IngressScope::VpcCidr,
        scaling: None,
        consumes_events: true,
    },
    ServiceProfile {
        kind: ServiceKind::Invoices,
        display_name: "InvoicesService",
        container_name: "invoicesService",
        repository_name: "invoicesservice",
        family: "invoices-service",
        image_tag: "1.0.0",
        port: 9095,
        tracing_name: "invoicesService",
        ingress: IngressScope::VpcCidr,
        scaling: Some(ScalingRange { min: 2, max: 4 }),
        consumes_events: false,
    },
];

/// Profile of `kind`. Every `ServiceKind` has exactly one entry.
pub fn profile(kind: ServiceKind) -> &'static ServiceProfile {
    match kind {
        ServiceKind::Products => &SERVICE_PROFILES[0],
        ServiceKind::Audit => &SERVICE_PROFILES[1],
        ServiceKind::Invoices => &SERVICE_PROFILES[2],
    }
}

// ── Fargate sizing ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSize {
    pub cpu: u32,
    pub memory_mib: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSize {
    pub task: ContainerSize,
    pub app: ContainerSize,
    pub sidecar: ContainerSize,
}

pub const TASK_SIZE: TaskSize = TaskSize {
    task: ContainerSize {
        cpu: 512,
        memory_mib: 1024,
    },
    app: ContainerSize {
        cpu: 384,
        memory_mib: 896,
    },
    sidecar: ContainerSize {
        cpu: 128,
        memory_mib: 128,
    },
};

pub const XRAY_IMAGE: &str = "public.ecr.aws/xray/aws-xray-daemon:latest";
pub const XRAY_PORT: u16 = 2000;
pub const DESIRED_COUNT: u32 = 2;
pub const HEALTH_CHECK_PATH: &str = "/actuator/health";
pub const LOG_RETENTION_DAYS: u32 = 30;

impl TaskSize {
    /// Memory sizes Fargate accepts for a task CPU value, in MiB.
    fn memory_range(cpu: u32) -> Option<(u32, u32, u32)> {
        match cpu {
            256 => Some((512, 2048, 512)),
            512 => Some((1024, 4096, 1024)),
            1024 => Some((2048, 8192, 1024)),
            2048 => Some((4096, 16384, 1024)),
            4096 => Some((8192, 30720, 1024)),
            _ => None,
        }
    }

    /// Check the task size is a valid Fargate combination and the
    /// containers fit inside it.
    pub fn validate(&self, stack: &StackId) -> Result<(), DomainError> {
        let out_of_range = |field: &str, reason: String| DomainError::OutOfRange {
            stack: stack.to_string(),
            field: field.to_string(),
            reason,
        };

        let (min, max, step) = Self::memory_range(self.task.cpu).ok_or_else(|| {
            out_of_range(
                "task cpu",
                format!("{} is not a Fargate CPU value", self.task.cpu),
            )
        })?;
        DomainValidator::validate_range(stack, "task memory", self.task.memory_mib, min, max)?;
        if (self.task.memory_mib - min) % step != 0 {
            return Err(out_of_range(
                "task memory",
                format!("{} MiB is not a multiple of {step} MiB", self.task.memory_mib),
            ));
        }

        if self.app.cpu + self.sidecar.cpu > self.task.cpu {
            return Err(out_of_range(
                "container cpu",
                "containers reserve more CPU than the task provides".to_string(),
            ));
        }
        if self.app.memory_mib + self.sidecar.memory_mib > self.task.memory_mib {
            return Err(out_of_range(
                "container memory",
                "containers reserve more memory than the task provides".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_kind_has_a_profile() {
        for kind in ServiceKind::ALL {
            assert_eq!(profile(kind).kind, kind);
        }
    }

    #[test]
    fn target_group_names_follow_container_names() {
        let products = profile(ServiceKind::Products);
        assert_eq!(products.alb_target_group(), "productsServiceAlb");
        assert_eq!(products.nlb_target_group(), "productsServiceNlb");
        assert_eq!(products.xray_name(), "XRayProductsService");
    }

    #[test]
    fn default_task_size_is_valid() {
        let stack = StackId::new("ProductsService").unwrap();
        assert!(TASK_SIZE.validate(&stack).is_ok());
    }

    #[test]
    fn oversized_containers_are_rejected() {
        let stack = StackId::new("ProductsService").unwrap();
        let size = TaskSize {
            app: ContainerSize {
                cpu: 512,
                memory_mib: 896,
            },
            ..TASK_SIZE
        };

        let err = size.validate(&stack).unwrap_err();
        assert!(matches!(err, DomainError::OutOfRange { ref field, .. } if field == "container cpu"));
    }

    #[test]
    fn unsupported_fargate_memory_is_rejected() {
        let stack = StackId::new("ProductsService").unwrap();
        let size = TaskSize {
            task: ContainerSize {
                cpu: 512,
                memory_mib: 1536,
            },
            ..TASK_SIZE
        };

        assert!(size.validate(&stack).is_err());
    }
}
