use crate::domain::{
    entities::{ArtifactLayout, StackDefinition},
    error::DomainError,
    value_objects::StackId,
};

/// Naming rules of the AWS resources the stacks declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// 2-256 chars, lowercase, starts with a letter or digit.
    EcrRepository,
    /// 1-32 chars, alphanumeric or hyphen, no leading or trailing hyphen.
    LoadBalancer,
    /// Same as `LoadBalancer`.
    TargetGroup,
    /// 1-80 chars, alphanumeric, hyphen or underscore.
    Queue,
    /// 1-256 chars, alphanumeric, hyphen or underscore.
    Topic,
    /// 3-255 chars, alphanumeric, underscore, hyphen or dot.
    Table,
    /// 1-512 chars, alphanumeric, `_-/.#`.
    LogGroup,
}

impl NameRule {
    fn check(self, name: &str) -> Option<&'static str> {
        let len = name.len();
        let chars_ok = |extra: &str| {
            name.chars()
                .all(|c| c.is_ascii_alphanumeric() || extra.contains(c))
        };

        match self {
            Self::EcrRepository => {
                if !(2..=256).contains(&len) {
                    Some("must be 2-256 characters")
                } else if name.chars().any(|c| c.is_ascii_uppercase()) {
                    Some("must be lowercase")
                } else if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                    Some("must start with a letter or digit")
                } else if !chars_ok("._/-") {
                    Some("only letters, digits and ._/- are allowed")
                } else {
                    None
                }
            }
            Self::LoadBalancer | Self::TargetGroup => {
                if !(1..=32).contains(&len) {
                    Some("must be 1-32 characters")
                } else if name.starts_with('-') || name.ends_with('-') {
                    Some("must not start or end with a hyphen")
                } else if !chars_ok("-") {
                    Some("only letters, digits and hyphens are allowed")
                } else {
                    None
                }
            }
            Self::Queue => {
                if !(1..=80).contains(&len) {
                    Some("must be 1-80 characters")
                } else if !chars_ok("-_") {
                    Some("only letters, digits, hyphens and underscores are allowed")
                } else {
                    None
                }
            }
            Self::Topic => {
                if !(1..=256).contains(&len) {
                    Some("must be 1-256 characters")
                } else if !chars_ok("-_") {
                    Some("only letters, digits, hyphens and underscores are allowed")
                } else {
                    None
                }
            }
            Self::Table => {
                if !(3..=255).contains(&len) {
                    Some("must be 3-255 characters")
                } else if !chars_ok("_-.") {
                    Some("only letters, digits and _-. are allowed")
                } else {
                    None
                }
            }
            Self::LogGroup => {
                if !(1..=512).contains(&len) {
                    Some("must be 1-512 characters")
                } else if !chars_ok("_-/.#") {
                    Some("only letters, digits and _-/.# are allowed")
                } else {
                    None
                }
            }
        }
    }
}

/// Log retention periods CloudWatch accepts, in days.
const RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// Centralized domain validation.
///
/// The local checks a stack runs on its own configuration while it is
/// constructed, plus the check of a rendered layout.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_stack(stack: &StackDefinition) -> Result<(), DomainError> {
        stack.validate()
    }

    pub fn validate_layout(layout: &ArtifactLayout) -> Result<(), DomainError> {
        layout.validate()
    }

    pub fn validate_name(
        stack: &StackId,
        resource: &str,
        name: &str,
        rule: NameRule,
    ) -> Result<(), DomainError> {
        match rule.check(name) {
            Some(reason) => Err(DomainError::InvalidResourceName {
                stack: stack.to_string(),
                resource: resource.to_string(),
                name: name.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn validate_port(stack: &StackId, field: &str, port: u16) -> Result<(), DomainError> {
        if port == 0 {
            return Err(out_of_range(stack, field, "port must be between 1 and 65535"));
        }
        Ok(())
    }

    pub fn validate_retention(stack: &StackId, days: u32) -> Result<(), DomainError> {
        if !RETENTION_DAYS.contains(&days) {
            return Err(out_of_range(
                stack,
                "log retention",
                &format!("{days} days is not a CloudWatch retention period"),
            ));
        }
        Ok(())
    }

    pub fn validate_range(
        stack: &StackId,
        field: &str,
        value: u32,
        min: u32,
        max: u32,
    ) -> Result<(), DomainError> {
        if !(min..=max).contains(&value) {
            return Err(out_of_range(
                stack,
                field,
                &format!("{value} is outside {min}..={max}"),
            ));
        }
        Ok(())
    }
}

fn out_of_range(stack: &StackId, field: &str, reason: &str) -> DomainError {
    DomainError::OutOfRange {
        stack: stack.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> StackId {
        StackId::new("Ecr").unwrap()
    }

    #[test]
    fn ecr_repository_names_must_be_lowercase() {
        assert!(
            DomainValidator::validate_name(&stack(), "Repo", "productsservice", NameRule::EcrRepository)
                .is_ok()
        );

        let err = DomainValidator::validate_name(
            &stack(),
            "Repo",
            "ProductsService",
            NameRule::EcrRepository,
        )
        .unwrap_err();
        assert!(err.to_string().contains("stack 'Ecr'"));
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn queue_names_are_limited_to_80_characters() {
        let long = "q".repeat(81);
        assert!(DomainValidator::validate_name(&stack(), "Queue", &long, NameRule::Queue).is_err());
        assert!(
            DomainValidator::validate_name(&stack(), "Queue", "product-events", NameRule::Queue)
                .is_ok()
        );
    }

    #[test]
    fn target_group_names_are_limited_to_32_characters() {
        assert!(
            DomainValidator::validate_name(&stack(), "Tg", "productsServiceAlb", NameRule::TargetGroup)
                .is_ok()
        );
        assert!(
            DomainValidator::validate_name(&stack(), "Tg", &"t".repeat(33), NameRule::TargetGroup)
                .is_err()
        );
    }

    #[test]
    fn ranges_and_retention() {
        assert!(DomainValidator::validate_port(&stack(), "port", 0).is_err());
        assert!(DomainValidator::validate_retention(&stack(), 30).is_ok());
        assert!(DomainValidator::validate_retention(&stack(), 31).is_err());
        assert!(DomainValidator::validate_range(&stack(), "min capacity", 2, 1, 4).is_ok());
        assert!(matches!(
            DomainValidator::validate_range(&stack(), "max capacity", 5, 1, 4),
            Err(DomainError::OutOfRange { .. })
        ));
    }
}
