use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::error::DomainError;

/// Files of a cloud assembly, ready to be written under `root`.
///
/// Pure data: produced by the synthesis service, materialised by a
/// `Filesystem` adapter.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
    files: Vec<ArtifactFile>,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: String) {
        self.files.push(ArtifactFile {
            path: path.into(),
            content,
        });
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: String) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.files.is_empty() {
            return Err(DomainError::EmptyArtifactLayout);
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            let path = file.path.display().to_string();
            if file.path.is_absolute() {
                return Err(DomainError::AbsoluteArtifactPath { path });
            }
            if !seen.insert(file.path.as_path()) {
                return Err(DomainError::DuplicateArtifactPath { path });
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> impl Iterator<Item = &ArtifactFile> {
        self.files.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(ArtifactFile::size).sum()
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub content: String,
}

impl ArtifactFile {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_and_absolute_paths() {
        let duplicate = ArtifactLayout::new("out")
            .with_file("Vpc.template.json", "{}".into())
            .with_file("Vpc.template.json", "{}".into());
        assert!(matches!(
            duplicate.validate(),
            Err(DomainError::DuplicateArtifactPath { .. })
        ));

        let absolute = ArtifactLayout::new("out").with_file("/etc/manifest.json", "{}".into());
        assert!(matches!(
            absolute.validate(),
            Err(DomainError::AbsoluteArtifactPath { .. })
        ));

        assert!(matches!(
            ArtifactLayout::new("out").validate(),
            Err(DomainError::EmptyArtifactLayout)
        ));
    }
}
