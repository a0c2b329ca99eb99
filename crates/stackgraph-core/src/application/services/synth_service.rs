//! Synth Service - renders an assembly and writes it out.
//!
//! The workflow:
//! 1. Render one template per constructed stack
//! 2. Render the manifest describing them
//! 3. Write every file under the output directory, rolling back on failure

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, SynthesizedTemplate, TEMPLATE_SUFFIX, TemplateSynthesizer},
    },
    domain::{ArtifactLayout, Assembly, DomainValidator as validator},
    error::{StackgraphError, StackgraphResult},
};

/// File name of the assembly manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// What a synth run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthSummary {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub bytes: usize,
    /// False for dry runs.
    pub written: bool,
}

impl SynthSummary {
    pub fn from_layout(layout: &ArtifactLayout, written: bool) -> Self {
        Self {
            root: layout.root().to_path_buf(),
            files: layout.files().map(|f| f.path.clone()).collect(),
            bytes: layout.total_bytes(),
            written,
        }
    }
}

pub struct SynthService {
    synthesizer: Box<dyn TemplateSynthesizer>,
    filesystem: Box<dyn Filesystem>,
}

impl SynthService {
    pub fn new(synthesizer: Box<dyn TemplateSynthesizer>, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            synthesizer,
            filesystem,
        }
    }

    /// Render and write `assembly` under `root`.
    ///
    /// An existing `root` is an error unless `overwrite` is set and it holds
    /// a previous assembly, in which case it is removed first.
    #[instrument(
        skip_all,
        fields(output = %root.as_ref().display(), stacks = assembly.len(), overwrite)
    )]
    pub fn synthesize(
        &self,
        assembly: &Assembly,
        root: impl AsRef<Path>,
        overwrite: bool,
    ) -> StackgraphResult<SynthSummary> {
        let layout = self.prepare(assembly, root.as_ref())?;
        self.write(&layout, overwrite)?;

        info!(files = layout.file_count(), bytes = layout.total_bytes(), "Assembly written");
        Ok(SynthSummary::from_layout(&layout, true))
    }

    /// Render every template and the manifest without touching the filesystem.
    pub fn prepare(&self, assembly: &Assembly, root: &Path) -> StackgraphResult<ArtifactLayout> {
        let templates = self.render(assembly)?;
        let manifest = self.synthesizer.manifest(assembly, &templates)?;

        let mut layout = ArtifactLayout::new(root);
        for template in templates {
            layout.add_file(template.file_name(), template.body);
        }
        layout.add_file(MANIFEST_FILE, manifest);

        validator::validate_layout(&layout)?;
        Ok(layout)
    }

    /// Render one stack of the assembly.
    pub fn render_stack(
        &self,
        assembly: &Assembly,
        stack: &str,
    ) -> StackgraphResult<SynthesizedTemplate> {
        let constructed = assembly
            .get(stack)
            .ok_or_else(|| ApplicationError::StackNotFound {
                stack: stack.to_string(),
            })?;
        self.synthesizer.synthesize(&constructed.definition)
    }

    fn render(&self, assembly: &Assembly) -> StackgraphResult<Vec<SynthesizedTemplate>> {
        assembly
            .stacks()
            .iter()
            .map(|stack| {
                let template = self.synthesizer.synthesize(&stack.definition)?;
                debug!(stack = %stack.id(), bytes = template.body.len(), "Template rendered");
                Ok(template)
            })
            .collect()
    }

    /// Write the layout with rollback on failure.
    fn write(&self, layout: &ArtifactLayout, overwrite: bool) -> StackgraphResult<()> {
        let root = layout.root();

        if self.filesystem.exists(root) {
            if !overwrite {
                return Err(ApplicationError::OutputExists {
                    path: root.to_path_buf(),
                }
                .into());
            }
            self.ensure_previous_assembly(root)?;
            warn!(path = %root.display(), "Replacing existing output directory");
            self.filesystem.remove_dir_all(root)?;
        }

        match self.write_all(layout) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Write failed, attempting rollback");
                self.rollback(root, e)
            }
        }
    }

    /// Only a directory holding a manifest and templates may be replaced.
    /// An empty directory has nothing to lose.
    fn ensure_previous_assembly(&self, root: &Path) -> StackgraphResult<()> {
        let names: Vec<String> = self
            .filesystem
            .list_dir(root)?
            .iter()
            .map(|entry| match entry.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => entry.display().to_string(),
            })
            .collect();

        let foreign = names
            .iter()
            .find(|name| name.as_str() != MANIFEST_FILE && !name.ends_with(TEMPLATE_SUFFIX))
            .or_else(|| {
                let has_manifest = names.iter().any(|name| name == MANIFEST_FILE);
                names.first().filter(|_| !has_manifest)
            });

        match foreign {
            Some(entry) => Err(ApplicationError::ForeignOutput {
                path: root.to_path_buf(),
                entry: entry.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn write_all(&self, layout: &ArtifactLayout) -> StackgraphResult<()> {
        self.filesystem.create_dir_all(layout.root())?;

        for file in layout.files() {
            let path = layout.root().join(&file.path);
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, &file.content)?;
        }

        Ok(())
    }

    /// Remove the partial output and hand back the write error.
    fn rollback(&self, root: &Path, cause: StackgraphError) -> StackgraphResult<()> {
        match self.filesystem.remove_dir_all(root) {
            Ok(()) => {
                info!("Rollback successful");
                Err(cause)
            }
            Err(e) => {
                warn!(error = %e, path = %root.display(), "Rollback failed");
                Err(ApplicationError::RollbackFailed {
                    path: root.to_path_buf(),
                    reason: format!("{cause}; cleanup failed: {e}"),
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockFilesystem, MockTemplateSynthesizer};
    use crate::application::services::Orchestrator;
    use crate::domain::{ConstructionPlan, DeploymentSettings, PlanEntry, StackId, StackKind};
    use crate::error::ErrorCategory;

    fn assembly() -> Assembly {
        let plan = ConstructionPlan::new()
            .with_entry(PlanEntry::new(StackId::new("Ecr").unwrap(), StackKind::Registry))
            .with_entry(PlanEntry::new(StackId::new("Vpc").unwrap(), StackKind::Network));
        Orchestrator::new()
            .construct(&plan, &DeploymentSettings::default())
            .unwrap()
    }

    fn synthesizer() -> MockTemplateSynthesizer {
        let mut synthesizer = MockTemplateSynthesizer::new();
        synthesizer.expect_synthesize().returning(|stack| {
            Ok(SynthesizedTemplate {
                stack: stack.id().clone(),
                body: format!("{{\"Description\":\"{}\"}}", stack.id()),
            })
        });
        synthesizer
            .expect_manifest()
            .returning(|_, templates| Ok(format!("{{\"artifacts\":{}}}", templates.len())));
        synthesizer
    }

    #[test]
    fn prepare_lays_out_one_template_per_stack_and_a_manifest() {
        let service = SynthService::new(Box::new(synthesizer()), Box::new(MockFilesystem::new()));

        let layout = service.prepare(&assembly(), Path::new("out")).unwrap();
        let paths: Vec<_> = layout.files().map(|f| f.path.clone()).collect();

        assert_eq!(
            paths,
            [
                PathBuf::from("Ecr.template.json"),
                PathBuf::from("Vpc.template.json"),
                PathBuf::from(MANIFEST_FILE),
            ]
        );
    }

    #[test]
    fn writes_every_file_under_the_root() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(false);
        filesystem.expect_create_dir_all().returning(|_| Ok(()));
        filesystem
            .expect_write_file()
            .times(3)
            .returning(|_, _| Ok(()));
        filesystem.expect_remove_dir_all().never();

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let summary = service.synthesize(&assembly(), "out", false).unwrap();

        assert!(summary.written);
        assert_eq!(summary.files.len(), 3);
        assert_eq!(summary.root, PathBuf::from("out"));
    }

    #[test]
    fn existing_output_is_rejected_without_overwrite() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(true);
        filesystem.expect_write_file().never();
        filesystem.expect_remove_dir_all().never();

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let err = service.synthesize(&assembly(), "out", false).unwrap_err();

        assert!(matches!(
            err,
            StackgraphError::Application(ApplicationError::OutputExists { .. })
        ));
    }

    #[test]
    fn overwrite_replaces_existing_output() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(true);
        filesystem.expect_list_dir().returning(|root| {
            Ok(vec![
                root.join("Ecr.template.json"),
                root.join(MANIFEST_FILE),
            ])
        });
        filesystem
            .expect_remove_dir_all()
            .withf(|path| path == Path::new("out"))
            .times(1)
            .returning(|_| Ok(()));
        filesystem.expect_create_dir_all().returning(|_| Ok(()));
        filesystem.expect_write_file().returning(|_, _| Ok(()));

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        assert!(service.synthesize(&assembly(), "out", true).is_ok());
    }

    #[test]
    fn overwrite_refuses_a_directory_with_unrelated_entries() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(true);
        filesystem.expect_list_dir().returning(|root| {
            Ok(vec![
                root.join("Cargo.toml"),
                root.join(MANIFEST_FILE),
                root.join("src"),
            ])
        });
        filesystem.expect_remove_dir_all().never();
        filesystem.expect_write_file().never();

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let err = service.synthesize(&assembly(), "project", true).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        match err {
            StackgraphError::Application(ApplicationError::ForeignOutput { path, entry }) => {
                assert_eq!(path, PathBuf::from("project"));
                assert_eq!(entry, "Cargo.toml");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn overwrite_refuses_templates_without_a_manifest() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(true);
        filesystem
            .expect_list_dir()
            .returning(|root| Ok(vec![root.join("Ecr.template.json")]));
        filesystem.expect_remove_dir_all().never();

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let err = service.synthesize(&assembly(), "out", true).unwrap_err();

        assert!(matches!(
            err,
            StackgraphError::Application(ApplicationError::ForeignOutput { .. })
        ));
    }

    #[test]
    fn overwrite_accepts_an_empty_directory() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(true);
        filesystem.expect_list_dir().returning(|_| Ok(Vec::new()));
        filesystem
            .expect_remove_dir_all()
            .times(1)
            .returning(|_| Ok(()));
        filesystem.expect_create_dir_all().returning(|_| Ok(()));
        filesystem.expect_write_file().returning(|_, _| Ok(()));

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        assert!(service.synthesize(&assembly(), "out", true).is_ok());
    }

    #[test]
    fn failed_write_rolls_back_the_output_directory() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(false);
        filesystem.expect_create_dir_all().returning(|_| Ok(()));
        filesystem.expect_write_file().returning(|path, _| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        filesystem
            .expect_remove_dir_all()
            .withf(|path| path == Path::new("out"))
            .times(1)
            .returning(|_| Ok(()));

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let err = service.synthesize(&assembly(), "out", false).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Backend);
        assert!(matches!(
            err,
            StackgraphError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[test]
    fn failed_cleanup_after_a_failed_write_is_reported() {
        let mut filesystem = MockFilesystem::new();
        filesystem.expect_exists().return_const(false);
        filesystem.expect_create_dir_all().returning(|_| Ok(()));
        filesystem.expect_write_file().returning(|path, _| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        filesystem.expect_remove_dir_all().returning(|path| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into())
        });

        let service = SynthService::new(Box::new(synthesizer()), Box::new(filesystem));
        let err = service.synthesize(&assembly(), "out", false).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Backend);
        match err {
            StackgraphError::Application(ApplicationError::RollbackFailed { path, reason }) => {
                assert_eq!(path, PathBuf::from("out"));
                assert!(reason.contains("disk full"));
                assert!(reason.contains("permission denied"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn render_stack_rejects_unknown_ids() {
        let service = SynthService::new(Box::new(synthesizer()), Box::new(MockFilesystem::new()));

        let template = service.render_stack(&assembly(), "Vpc").unwrap();
        assert_eq!(template.file_name(), "Vpc.template.json");

        let err = service.render_stack(&assembly(), "Api").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.stack(), Some("Api"));
    }
}
