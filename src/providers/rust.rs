//! Rust (cargo) provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Crate name to framework tag
const FRAMEWORKS: &[(&str, &str)] = &[
    ("actix-web", "actix-web"),
    ("axum", "axum"),
    ("rocket", "rocket"),
    ("warp", "warp"),
    ("poem", "poem"),
];

pub struct RustProvider;

fn toolchain_version(file: &str, content: &str) -> Option<String> {
    if file.ends_with(".toml") {
        let parsed: toml::Value = toml::from_str(content).ok()?;
        return parsed
            .get("toolchain")?
            .get("channel")?
            .as_str()
            .map(|s| s.to_string());
    }
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Provider for RustProvider {
    fn name(&self) -> &str {
        "rust"
    }

    fn language(&self) -> &str {
        "rust"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let Some(content) = project.read(ctx, "Cargo.toml")? else {
            return Ok(DetectResult::no_match());
        };

        let manifest: Option<toml::Value> = match toml::from_str(&content) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "Cargo.toml could not be parsed");
                None
            }
        };

        let package = manifest.as_ref().and_then(|m| m.get("package"));
        let workspace = manifest.as_ref().and_then(|m| m.get("workspace"));
        let confidence = if package.is_some() || workspace.is_some() {
            0.95
        } else {
            0.8
        };

        let mut evidence = vec!["Cargo.toml".to_string()];
        evidence.extend(project.present(&["Cargo.lock"]));

        let mut result = DetectResult::matched(self.name(), self.language(), confidence)
            .with_package_manager("cargo")
            .with_build_tool("cargo");

        if let Some(name) = package.and_then(|p| p.get("name")).and_then(|n| n.as_str()) {
            result = result.with_metadata("binary", name);
        }
        if workspace.is_some() {
            result = result.with_metadata("workspace", "true");
        }

        if let Some(deps) = manifest
            .as_ref()
            .and_then(|m| m.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            if let Some((_, framework)) = FRAMEWORKS.iter().find(|(krate, _)| deps.contains_key(*krate))
            {
                result = result.with_framework(*framework);
            }
        }

        let mut version = None;
        if let Some(file) = project.first_of(&["rust-toolchain.toml", "rust-toolchain"]) {
            if let Some(content) = project.read(ctx, file)? {
                version = toolchain_version(file, &content);
                if version.is_some() {
                    evidence.push(file.to_string());
                }
            }
        }
        if version.is_none() {
            version = package
                .and_then(|p| p.get("rust-version"))
                .and_then(|v| v.as_str())
                .map(|v| v.to_string());
        }
        if let Some(version) = version {
            result = result.with_version(version);
        }

        Ok(result.with_evidence(evidence, "Cargo manifest found"))
    }

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands {
        let binary = result.meta("binary").unwrap_or("app");
        let build = if options.offline {
            "cargo build --release --offline"
        } else {
            "cargo build --release"
        };

        Commands {
            dev: vec!["cargo run".to_string()],
            build: vec![build.to_string()],
            start: vec![format!("./target/release/{}", binary)],
        }
    }

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String> {
        let mut env = env_map(&[("RUST_LOG", "info")]);
        if result.framework == "rocket" {
            env.insert("ROCKET_ADDRESS".to_string(), "0.0.0.0".to_string());
        }
        env
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        true
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["target"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::Fixture;

    #[test]
    fn test_axum_service() {
        let fixture = Fixture::new(&[
            (
                "Cargo.toml",
                "[package]\nname = \"svc\"\nversion = \"0.1.0\"\nrust-version = \"1.75\"\n\n[dependencies]\naxum = \"0.7\"\ntokio = \"1\"\n",
            ),
            ("Cargo.lock", ""),
            ("src/main.rs", "fn main() {}"),
        ]);
        let result = fixture.detect(&RustProvider);

        assert!(result.matched);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.framework, "axum");
        assert_eq!(result.version, "1.75");
        assert_eq!(result.meta("binary"), Some("svc"));
        assert_eq!(result.evidence.files, vec!["Cargo.toml", "Cargo.lock"]);
        assert!(RustProvider.needs_native_compilation(&result));

        let commands = RustProvider.generate_commands(&result, &CommandOptions { offline: true });
        assert_eq!(commands.build, vec!["cargo build --release --offline"]);
        assert_eq!(commands.start, vec!["./target/release/svc"]);
    }

    #[test]
    fn test_toolchain_file_wins() {
        let fixture = Fixture::new(&[
            ("Cargo.toml", "[package]\nname = \"x\"\nrust-version = \"1.70\"\n"),
            ("rust-toolchain.toml", "[toolchain]\nchannel = \"1.79.0\"\n"),
        ]);
        let result = fixture.detect(&RustProvider);
        assert_eq!(result.version, "1.79.0");
        assert!(result.evidence.files.contains(&"rust-toolchain.toml".to_string()));
    }

    #[test]
    fn test_workspace_manifest() {
        let fixture = Fixture::new(&[("Cargo.toml", "[workspace]\nmembers = [\"a\", \"b\"]\n")]);
        let result = fixture.detect(&RustProvider);
        assert_eq!(result.confidence, 0.95);
        assert!(result.meta_flag("workspace"));
        assert_eq!(result.meta("binary"), None);
    }

    #[test]
    fn test_unparseable_manifest() {
        let fixture = Fixture::new(&[("Cargo.toml", "[package\nname = ")]);
        let result = fixture.detect(&RustProvider);
        assert!(result.matched);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_plain_toolchain_file() {
        assert_eq!(toolchain_version("rust-toolchain", "stable\n").as_deref(), Some("stable"));
    }
}
