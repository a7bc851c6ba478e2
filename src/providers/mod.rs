//! Language providers and the contract they implement
//!
//! A provider inspects the file inventory of a project and decides whether it
//! recognises it. Providers are stateless: every method is a pure function of
//! its arguments, which is what lets the detection engine run them in any
//! order (or in parallel) and still produce deterministic output.

mod deno;
mod files;
mod go;
mod java;
mod node;
mod php;
mod python;
mod registry;
mod ruby;
mod rust;
mod shell;
mod staticfile;

pub use deno::DenoProvider;
pub use files::ProjectFiles;
pub use go::GoProvider;
pub use java::JavaProvider;
pub use node::NodeProvider;
pub use php::PhpProvider;
pub use python::PythonProvider;
pub use registry::ProviderRegistry;
pub use ruby::RubyProvider;
pub use rust::RustProvider;
pub use shell::ShellProvider;
pub use staticfile::StaticfileProvider;

use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Files and explanation that justified a detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub files: Vec<String>,
    pub reason: String,
}

impl Evidence {
    pub fn new(files: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            files,
            reason: reason.into(),
        }
    }
}

/// Outcome of a single provider run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResult {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub confidence: f64,
    pub language: String,
    pub framework: String,
    pub version: String,
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DetectResult {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            provider: None,
            confidence: 0.0,
            language: String::new(),
            framework: String::new(),
            version: String::new(),
            evidence: Evidence::default(),
            package_manager: None,
            build_tools: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn matched(provider: &str, language: &str, confidence: f64) -> Self {
        Self {
            matched: true,
            provider: Some(provider.to_string()),
            confidence,
            language: language.to_string(),
            ..Self::no_match()
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_evidence(mut self, files: Vec<String>, reason: impl Into<String>) -> Self {
        self.evidence = Evidence::new(files, reason);
        self
    }

    pub fn with_package_manager(mut self, package_manager: impl Into<String>) -> Self {
        self.package_manager = Some(package_manager.into());
        self
    }

    pub fn with_build_tool(mut self, tool: impl Into<String>) -> Self {
        self.build_tools.push(tool.into());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|v| v.as_str())
    }

    pub fn meta_flag(&self, key: &str) -> bool {
        self.meta(key) == Some("true")
    }

    pub fn has_framework(&self) -> bool {
        !self.framework.is_empty()
    }
}

/// Command lists for each lifecycle stage of the generated plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commands {
    pub dev: Vec<String>,
    pub build: Vec<String>,
    pub start: Vec<String>,
}

/// Knobs that influence command generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Prefer cached/vendored dependencies over network installs
    pub offline: bool,
}

/// Detector and command generator for one language runtime
///
/// `detect` must be side-effect free and only look at the inventory and the
/// files it can read through `ctx`. It returns `Err` only when evidence cannot
/// be read; "not my project" is `Ok` with `matched == false`.
pub trait Provider: Send + Sync {
    /// Registry key, unique across providers
    fn name(&self) -> &str;

    /// Canonical language tag reported in results
    fn language(&self) -> &str;

    /// Positive ordering key; lower runs first and wins ties
    fn priority(&self) -> u32;

    fn detect(
        &self,
        project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult>;

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands;

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String>;

    fn needs_native_compilation(&self, result: &DetectResult) -> bool;

    /// Directories the scanner should skip for projects of this kind
    fn excluded_dirs(&self) -> &[&str] {
        &[]
    }
}

pub(crate) fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
