use std::collections::BTreeMap;

use serde_json::json;

use crate::domain::{
    entities::{
        DeletionPolicy, DependencyOutputs, RegistryOutputs, RepositoryOutputs, Resource,
        StackScope,
    },
    error::DomainError,
    intrinsics::{get_att, reference},
    profiles::SERVICE_PROFILES,
    validation::{DomainValidator, NameRule},
};

/// One immutable image repository per service.
pub struct RegistryStack;

impl super::StackUnit for RegistryStack {
    type Config = ();
    type Outputs = RegistryOutputs;

    fn wire(&self, _deps: &DependencyOutputs<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    fn construct(&self, scope: &mut StackScope, _: ()) -> Result<RegistryOutputs, DomainError> {
        scope.set_description("Container image repositories of the e-commerce services");

        let mut repositories = BTreeMap::new();
        for profile in &SERVICE_PROFILES {
            DomainValidator::validate_name(
                scope.id(),
                profile.display_name,
                profile.repository_name,
                NameRule::EcrRepository,
            )?;

            let repository = scope.add(
                Resource::new(
                    format!("{}Repository", profile.display_name),
                    "AWS::ECR::Repository",
                    json!({
                        "RepositoryName": profile.repository_name,
                        "ImageTagMutability": "IMMUTABLE",
                        "EmptyOnDelete": true,
                    }),
                )
                .deletion_policy(DeletionPolicy::Delete),
            )?;

            let outputs = RepositoryOutputs {
                repository_name: scope.export(
                    &format!("{}RepositoryName", profile.display_name),
                    reference(&repository),
                )?,
                repository_arn: scope.export(
                    &format!("{}RepositoryArn", profile.display_name),
                    get_att(&repository, "Arn"),
                )?,
            };
            repositories.insert(profile.kind, outputs);
        }

        Ok(RegistryOutputs { repositories })
    }
}
