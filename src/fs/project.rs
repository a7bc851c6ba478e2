//! Read-only view of the project handed to providers
//!
//! Providers receive the file inventory up front. When a detector needs the
//! contents of a manifest it goes through [`ProjectContext`], which only
//! exposes reads relative to the project root.

use super::{FileSystem, RealFileSystem};
use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Largest evidence file a provider may read
pub const MAX_READ_BYTES: u64 = 1024 * 1024;

pub trait ProjectContext: Send + Sync {
    /// Absolute project root
    fn root(&self) -> &Path;

    /// Read a file by path relative to the project root
    fn read_file(&self, relative: &str) -> Result<String>;

    /// Whether a path relative to the project root exists
    fn exists(&self, relative: &str) -> bool;
}

/// [`ProjectContext`] over a local directory
#[derive(Clone)]
pub struct LocalProject {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl LocalProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, Arc::new(RealFileSystem))
    }

    pub fn with_fs(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("Path escapes project root: {}", relative);
        }
        Ok(self.root.join(rel))
    }
}

impl std::fmt::Debug for LocalProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProject")
            .field("root", &self.root)
            .finish()
    }
}

impl ProjectContext for LocalProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        let meta = self.fs.metadata(&path)?;
        if !meta.is_file() {
            bail!("Not a regular file: {}", relative);
        }
        if meta.size > MAX_READ_BYTES {
            bail!(
                "{} is too large to inspect ({} bytes, limit {})",
                relative,
                meta.size,
                MAX_READ_BYTES
            );
        }
        self.fs.read_to_string(&path)
    }

    fn exists(&self, relative: &str) -> bool {
        self.resolve(relative)
            .map(|p| self.fs.exists(&p))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn project() -> LocalProject {
        let fs = MockFileSystem::new()
            .with_file("/repo/package.json", "{}")
            .with_file("/repo/src/index.js", "console.log(1)");
        LocalProject::with_fs("/repo", Arc::new(fs))
    }

    #[test]
    fn test_read_relative_file() {
        let project = project();
        assert_eq!(project.read_file("package.json").unwrap(), "{}");
        assert_eq!(project.read_file("src/index.js").unwrap(), "console.log(1)");
        assert!(project.exists("src"));
        assert!(!project.exists("Cargo.toml"));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let project = project();
        assert!(project.read_file("../etc/passwd").is_err());
        assert!(project.read_file("/etc/passwd").is_err());
        assert!(!project.exists("../repo"));
    }

    #[test]
    fn test_rejects_directories_and_oversized_files() {
        let big = "x".repeat(MAX_READ_BYTES as usize + 1);
        let fs = MockFileSystem::new()
            .with_file("/repo/src/main.rs", "")
            .with_file("/repo/huge.json", big);
        let project = LocalProject::with_fs("/repo", Arc::new(fs));

        assert!(project.read_file("src").is_err());
        let err = project.read_file("huge.json").unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
