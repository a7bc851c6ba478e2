//! Static site provider

use super::{CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Manifests that mean the HTML is a build input, not the site itself
const APP_MANIFESTS: &[&str] = &[
    "package.json",
    "composer.json",
    "Gemfile",
    "requirements.txt",
    "pyproject.toml",
    "Cargo.toml",
    "go.mod",
];

pub struct StaticfileProvider;

fn staticfile_root(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "root")
            .then(|| value.trim().trim_matches('/').to_string())
            .filter(|v| !v.is_empty())
    })
}

impl Provider for StaticfileProvider {
    fn name(&self) -> &str {
        "staticfile"
    }

    fn language(&self) -> &str {
        "static"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);

        if let Some(content) = project.read(ctx, "Staticfile")? {
            let root = staticfile_root(&content).unwrap_or_else(|| ".".to_string());
            return Ok(DetectResult::matched(self.name(), self.language(), 0.9)
                .with_metadata("root", root)
                .with_evidence(vec!["Staticfile".to_string()], "Staticfile found"));
        }

        if !project.present(APP_MANIFESTS).is_empty() {
            return Ok(DetectResult::no_match());
        }

        let (index, root, confidence) = if project.has_file("index.html") {
            ("index.html", ".", 0.6)
        } else if project.has_file("public/index.html") {
            ("public/index.html", "public", 0.5)
        } else {
            return Ok(DetectResult::no_match());
        };

        Ok(DetectResult::matched(self.name(), self.language(), confidence)
            .with_metadata("root", root)
            .with_evidence(vec![index.to_string()], "static index.html without app manifest"))
    }

    fn generate_commands(&self, result: &DetectResult, _options: &CommandOptions) -> Commands {
        let root = result.meta("root").unwrap_or(".");
        let serve = format!("caddy file-server --root {} --listen :8080", root);
        Commands {
            dev: vec![serve.clone()],
            build: Vec::new(),
            start: vec![serve],
        }
    }

    fn generate_environment(&self, _result: &DetectResult) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::Fixture;

    #[test]
    fn test_staticfile_with_root() {
        let fixture = Fixture::new(&[("Staticfile", "root: dist/\n"), ("package.json", "{}")]);
        let result = fixture.detect(&StaticfileProvider);

        assert!(result.matched);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.language, "static");
        assert_eq!(result.meta("root"), Some("dist"));

        let commands = StaticfileProvider.generate_commands(&result, &CommandOptions::default());
        assert!(commands.build.is_empty());
        assert_eq!(commands.start, vec!["caddy file-server --root dist --listen :8080"]);
    }

    #[test]
    fn test_plain_index_html() {
        let fixture = Fixture::new(&[("index.html", "<html></html>"), ("style.css", "")]);
        let result = fixture.detect(&StaticfileProvider);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.meta("root"), Some("."));
    }

    #[test]
    fn test_index_html_in_node_project_is_ignored() {
        let fixture = Fixture::new(&[("index.html", ""), ("package.json", "{}")]);
        assert!(!fixture.detect(&StaticfileProvider).matched);
    }

    #[test]
    fn test_empty_staticfile_defaults_root() {
        assert_eq!(staticfile_root(""), None);
        assert_eq!(staticfile_root("gzip: true\nroot: public"), Some("public".to_string()));
    }
}
