//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use stackgraph_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StackgraphError, StackgraphResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> StackgraphResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> StackgraphResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, path: &Path) -> StackgraphResult<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)
            .map_err(|e| map_io_error(path, e, "read directory"))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_io_error(path, e, "read directory"))?;
        entries.sort();
        Ok(entries)
    }

    fn remove_dir_all(&self, path: &Path) -> StackgraphResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StackgraphError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_removes_a_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("stackgraph.out");
        let fs = LocalFilesystem::new();

        fs.create_dir_all(&root).unwrap();
        fs.write_file(&root.join("manifest.json"), "{}").unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("manifest.json")).unwrap(),
            "{}"
        );

        fs.remove_dir_all(&root).unwrap();
        assert!(!fs.exists(&root));
    }

    #[test]
    fn list_dir_returns_direct_children_sorted() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.create_dir_all(&temp.path().join("src")).unwrap();
        fs.write_file(&temp.path().join("src").join("main.rs"), "").unwrap();
        fs.write_file(&temp.path().join("Cargo.toml"), "").unwrap();

        assert_eq!(
            fs.list_dir(temp.path()).unwrap(),
            [temp.path().join("Cargo.toml"), temp.path().join("src")]
        );
    }

    #[test]
    fn io_failures_carry_the_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing").join("manifest.json");

        let err = LocalFilesystem::new().write_file(&missing, "{}").unwrap_err();
        match err {
            StackgraphError::Application(ApplicationError::FilesystemError { path, .. }) => {
                assert_eq!(path, missing)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
