use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// On-disk project built from (relative path, content) pairs
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent dirs");
            }
            fs::write(&full, content).expect("Failed to write fixture file");
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[allow(dead_code)]
pub fn stackplan_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stackplan"))
}
