use super::{EntryMetadata, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// In-memory [`FileSystem`] for tests
///
/// Parent directories of every added file are registered implicitly.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        self.files.insert(path, content.into());
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        self.dirs.insert(path.into());
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMetadata> {
        match self.files.get(path) {
            Some(content) => Ok(EntryMetadata::file(content.len() as u64)),
            None if self.dirs.contains(path) => Ok(EntryMetadata::dir()),
            None => Err(anyhow!("No such file or directory: {}", path.display())),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("No such file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_registers_parents() {
        let fs = MockFileSystem::new().with_file("/repo/config/application.rb", "");
        assert!(fs.metadata(Path::new("/repo/config/application.rb")).unwrap().is_file());
        assert!(fs.metadata(Path::new("/repo/config")).unwrap().is_dir());
        assert!(fs.exists(Path::new("/repo")));
        assert!(!fs.exists(Path::new("/repo/Gemfile")));
    }

    #[test]
    fn test_add_dir() {
        let mut fs = MockFileSystem::new();
        fs.add_dir("/repo/vendor");
        assert!(fs.metadata(Path::new("/repo/vendor")).unwrap().is_dir());
    }

    #[test]
    fn test_read_to_string() {
        let fs = MockFileSystem::new().with_file("/repo/go.mod", "module x");
        assert_eq!(fs.read_to_string(Path::new("/repo/go.mod")).unwrap(), "module x");
        assert!(fs.read_to_string(Path::new("/repo/missing")).is_err());
        assert_eq!(fs.metadata(Path::new("/repo/go.mod")).unwrap().size, 8);
    }
}
