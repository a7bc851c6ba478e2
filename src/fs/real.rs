use super::{EntryKind, EntryMetadata, FileSystem};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> Result<EntryMetadata> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;

        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };

        Ok(EntryMetadata {
            kind,
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_and_read() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("go.mod");
        std::fs::write(&file, "module example.com/app\n").unwrap();

        let fs = RealFileSystem;
        assert!(fs.exists(&file));
        assert!(fs.metadata(dir.path()).unwrap().is_dir());

        let meta = fs.metadata(&file).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.size, 23);
        assert!(meta.modified.is_some());

        assert_eq!(fs.read_to_string(&file).unwrap(), "module example.com/app\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(!RealFileSystem.exists(&missing));
        let err = RealFileSystem.read_to_string(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
