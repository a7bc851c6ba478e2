use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::{Context, Result};

/// Lookup helpers over the scanned inventory
#[derive(Debug, Clone, Copy)]
pub struct ProjectFiles<'a> {
    files: &'a [FileInfo],
}

impl<'a> ProjectFiles<'a> {
    pub fn new(files: &'a [FileInfo]) -> Self {
        Self { files }
    }

    /// Regular file at `path` (relative, `/`-separated)
    pub fn has_file(&self, path: &str) -> bool {
        self.files.iter().any(|f| !f.is_dir && f.path == path)
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.is_dir && f.path == path)
    }

    /// First of `candidates` present as a file, in candidate order
    pub fn first_of<'c>(&self, candidates: &[&'c str]) -> Option<&'c str> {
        candidates.iter().copied().find(|c| self.has_file(c))
    }

    /// All of `candidates` present as files, in candidate order
    pub fn present(&self, candidates: &[&str]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| self.has_file(c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn any_with_extension(&self, ext: &str) -> bool {
        self.files
            .iter()
            .any(|f| !f.is_dir && f.extension.as_deref() == Some(ext))
    }

    /// Files under `dir` whose name is `name`, e.g. `cmd/*/main.go`
    pub fn find_named_under(&self, dir: &str, name: &str) -> Vec<&'a FileInfo> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.files
            .iter()
            .filter(|f| !f.is_dir && f.name == name && f.path.starts_with(&prefix))
            .collect()
    }

    /// Reads `path` through the context if the inventory lists it
    ///
    /// A listed file that cannot be read is an error: the evidence exists but
    /// is unavailable, which is different from the file being absent.
    pub fn read(&self, ctx: &dyn ProjectContext, path: &str) -> Result<Option<String>> {
        if !self.has_file(path) {
            return Ok(None);
        }
        ctx.read_file(path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{LocalProject, MockFileSystem};
    use std::sync::Arc;

    fn inventory() -> Vec<FileInfo> {
        vec![
            FileInfo::file("go.mod"),
            FileInfo::dir("cmd"),
            FileInfo::dir("cmd/server"),
            FileInfo::file("cmd/server/main.go"),
            FileInfo::file("README.md"),
        ]
    }

    #[test]
    fn test_lookups() {
        let files = inventory();
        let project = ProjectFiles::new(&files);

        assert!(project.has_file("go.mod"));
        assert!(!project.has_file("cmd"));
        assert!(project.has_dir("cmd"));
        assert_eq!(project.first_of(&["main.go", "go.mod"]), Some("go.mod"));
        assert_eq!(project.present(&["go.sum", "go.mod", "README.md"]), vec!["go.mod", "README.md"]);
        assert!(project.any_with_extension("go"));
        assert!(!project.any_with_extension("py"));
        assert_eq!(project.find_named_under("cmd", "main.go").len(), 1);
    }

    #[test]
    fn test_read_absent_file_is_none() {
        let files = inventory();
        let ctx = LocalProject::with_fs("/p", Arc::new(MockFileSystem::new()));
        assert!(ProjectFiles::new(&files).read(&ctx, "package.json").unwrap().is_none());
    }

    #[test]
    fn test_read_listed_but_unreadable_is_error() {
        let files = inventory();
        let ctx = LocalProject::with_fs("/p", Arc::new(MockFileSystem::new()));
        let err = ProjectFiles::new(&files).read(&ctx, "go.mod").unwrap_err();
        assert!(err.to_string().contains("go.mod"));
    }
}
