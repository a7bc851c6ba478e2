use super::{FileInfo, ScanOptions};
use crate::providers::ProviderRegistry;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

const COMMON_EXCLUDED_DIRS: &[&str] = &[".git", ".idea", ".vscode", ".hg", ".svn"];

/// Builds the file inventory that providers detect against
pub struct ProjectScanner {
    root: PathBuf,
    excluded_dirs: HashSet<String>,
    options: ScanOptions,
}

impl ProjectScanner {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_registry(root, &ProviderRegistry::with_defaults())
    }

    pub fn with_registry(root: impl Into<PathBuf>, registry: &ProviderRegistry) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(anyhow::anyhow!("Project path does not exist: {:?}", root));
        }
        if !root.is_dir() {
            return Err(anyhow::anyhow!("Project path is not a directory: {:?}", root));
        }

        let root = root
            .canonicalize()
            .context("Failed to canonicalize project path")?;

        let mut excluded_dirs: HashSet<String> = COMMON_EXCLUDED_DIRS
            .iter()
            .map(|d| d.to_string())
            .collect();
        excluded_dirs.extend(registry.all_excluded_dirs());

        debug!(root = %root.display(), "ProjectScanner initialized");

        Ok(Self {
            root,
            excluded_dirs,
            options: ScanOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> Result<Vec<FileInfo>> {
        let start = Instant::now();

        info!(
            root = %self.root.display(),
            max_depth = self.options.max_depth,
            max_files = self.options.max_files,
            "Starting project scan"
        );

        let excluded = self.excluded_dirs.clone();
        let pruned: Arc<Mutex<BTreeSet<String>>> = Arc::default();
        let pruned_in_walk = Arc::clone(&pruned);
        let walker = WalkBuilder::new(&self.root)
            .max_depth(Some(self.options.max_depth))
            .hidden(false)
            .git_ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let name = entry.file_name().to_string_lossy();
                if !(is_dir && excluded.contains(name.as_ref())) {
                    return true;
                }
                // Only reached for dirs that survived .gitignore
                if entry.depth() == 1 && !COMMON_EXCLUDED_DIRS.contains(&name.as_ref()) {
                    if let Ok(mut pruned) = pruned_in_walk.lock() {
                        pruned.insert(name.into_owned());
                    }
                }
                false
            })
            .build();

        let mut files = Vec::new();
        let mut files_seen = 0usize;

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let rel_path = match entry.path().strip_prefix(&self.root) {
                Ok(p) => p.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                files.push(FileInfo::dir(rel_path));
                continue;
            }

            if files_seen >= self.options.max_files {
                warn!(
                    files_seen,
                    max_files = self.options.max_files,
                    "Reached file limit, stopping scan"
                );
                break;
            }
            files_seen += 1;

            let mut info = FileInfo::file(rel_path);
            if let Ok(meta) = entry.metadata() {
                info.size = Some(meta.len());
                info.modified = meta.modified().ok().map(DateTime::<Utc>::from);
            }
            files.push(info);
        }

        // Tool-owned dirs stay visible as entries but are never descended
        if let Ok(mut pruned) = pruned.lock() {
            files.extend(std::mem::take(&mut *pruned).into_iter().map(FileInfo::dir));
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            entries = files.len(),
            files_seen,
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Project scan completed"
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir(base.join(".git")).unwrap();
        fs::write(base.join("package.json"), r#"{"name": "test"}"#).unwrap();
        fs::create_dir_all(base.join("src/lib")).unwrap();
        fs::write(base.join("src/index.js"), "console.log('hi')").unwrap();
        fs::write(base.join("src/lib/util.js"), "module.exports = {}").unwrap();

        fs::create_dir(base.join("node_modules")).unwrap();
        fs::write(base.join("node_modules/package.json"), r#"{"name": "ignored"}"#).unwrap();

        dir
    }

    fn paths(files: &[FileInfo]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_scanner_invalid_path() {
        assert!(ProjectScanner::new("/nonexistent/path").is_err());
    }

    #[test]
    fn test_scanner_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("go.mod");
        fs::write(&file, "module x").unwrap();
        assert!(ProjectScanner::new(file).is_err());
    }

    #[test]
    fn test_scan_lists_files_and_dirs() {
        let dir = create_test_repo();
        let files = ProjectScanner::new(dir.path()).unwrap().scan().unwrap();
        let paths = paths(&files);

        assert!(paths.contains(&"package.json"));
        assert!(paths.contains(&"src"));
        assert!(paths.contains(&"src/index.js"));
        assert!(paths.contains(&"src/lib/util.js"));

        let src = files.iter().find(|f| f.path == "src").unwrap();
        assert!(src.is_dir);

        let manifest = files.iter().find(|f| f.path == "package.json").unwrap();
        assert_eq!(manifest.size, Some(16));
        assert_eq!(manifest.extension.as_deref(), Some("json"));
    }

    #[test]
    fn test_scan_skips_excluded_dirs() {
        let dir = create_test_repo();
        let files = ProjectScanner::new(dir.path()).unwrap().scan().unwrap();
        let paths = paths(&files);

        assert!(paths.contains(&"node_modules"));
        assert!(!paths.contains(&"node_modules/package.json"));
        assert!(!paths.iter().any(|p| p.starts_with(".git")));
    }

    #[test]
    fn test_gitignored_tool_dirs_are_not_listed() {
        let dir = create_test_repo();
        fs::write(dir.path().join(".gitignore"), "node_modules/\n").unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();

        let files = ProjectScanner::new(dir.path()).unwrap().scan().unwrap();
        let paths = paths(&files);

        assert!(!paths.contains(&"node_modules"));
        assert!(paths.contains(&"target"));
        assert!(paths.contains(&".gitignore"));
    }

    #[test]
    fn test_scan_respects_max_depth() {
        let dir = create_test_repo();
        let files = ProjectScanner::new(dir.path())
            .unwrap()
            .with_options(ScanOptions {
                max_depth: 1,
                max_files: 1000,
            })
            .scan()
            .unwrap();
        let paths = paths(&files);

        assert!(paths.contains(&"package.json"));
        assert!(paths.contains(&"src"));
        assert!(!paths.contains(&"src/index.js"));
    }

    #[test]
    fn test_scan_respects_max_files() {
        let dir = create_test_repo();
        let files = ProjectScanner::new(dir.path())
            .unwrap()
            .with_options(ScanOptions {
                max_depth: 10,
                max_files: 2,
            })
            .scan()
            .unwrap();

        assert_eq!(files.iter().filter(|f| !f.is_dir).count(), 2);
    }

    #[test]
    fn test_scan_is_sorted() {
        let dir = create_test_repo();
        let files = ProjectScanner::new(dir.path()).unwrap().scan().unwrap();
        let mut sorted = paths(&files);
        sorted.sort();
        assert_eq!(paths(&files), sorted);
    }
}
