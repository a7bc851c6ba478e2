use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Kind of filesystem entry after following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl EntryMetadata {
    pub fn file(size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            size,
            modified: None,
        }
    }

    pub fn dir() -> Self {
        Self {
            kind: EntryKind::Dir,
            size: 0,
            modified: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Disk access used by [`LocalProject`](super::LocalProject), swappable for tests
pub trait FileSystem: Send + Sync {
    fn metadata(&self, path: &Path) -> Result<EntryMetadata>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let file = EntryMetadata::file(42);
        assert!(file.is_file());
        assert!(!file.is_dir());
        assert_eq!(file.size, 42);

        let dir = EntryMetadata::dir();
        assert!(dir.is_dir());
        assert_eq!(dir.kind, EntryKind::Dir);
    }
}
