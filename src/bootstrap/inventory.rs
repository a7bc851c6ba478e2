use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of the project file inventory
///
/// `path` is relative to the project root and always uses `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    pub fn file(path: impl Into<String>) -> Self {
        let path = normalize(path.into());
        let name = file_name(&path);
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_string());

        Self {
            path,
            name,
            is_dir: false,
            size: None,
            extension,
            modified: None,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        let path = normalize(path.into());
        let name = file_name(&path);

        Self {
            path,
            name,
            is_dir: true,
            size: None,
            extension: None,
            modified: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Number of directories between the project root and this entry
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }

    pub fn is_root_level(&self) -> bool {
        !self.path.contains('/')
    }
}

fn normalize(path: String) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").trim_matches('/').to_string()
}

fn file_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Limits applied while building the inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_files: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_from_path() {
        let info = FileInfo::file("src/main.go");
        assert_eq!(info.path, "src/main.go");
        assert_eq!(info.name, "main.go");
        assert_eq!(info.extension.as_deref(), Some("go"));
        assert!(!info.is_dir);
        assert_eq!(info.depth(), 1);
        assert!(!info.is_root_level());
    }

    #[test]
    fn test_file_info_normalizes_separators() {
        let info = FileInfo::file(".\\config\\application.rb");
        assert_eq!(info.path, "config/application.rb");
        assert_eq!(info.name, "application.rb");
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let info = FileInfo::file(".nvmrc");
        assert_eq!(info.name, ".nvmrc");
        assert_eq!(info.extension, None);
        assert!(info.is_root_level());
    }

    #[test]
    fn test_dir_entry() {
        let info = FileInfo::dir("public/");
        assert_eq!(info.path, "public");
        assert!(info.is_dir);
        assert_eq!(info.extension, None);
    }

    #[test]
    fn test_scan_options_default() {
        let options = ScanOptions::default();
        assert_eq!(options.max_depth, 10);
        assert_eq!(options.max_files, 1000);
    }
}
