//! Go modules provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Module path prefix to framework tag
const FRAMEWORKS: &[(&str, &str)] = &[
    ("github.com/gin-gonic/gin", "gin"),
    ("github.com/labstack/echo", "echo"),
    ("github.com/gofiber/fiber", "fiber"),
    ("github.com/go-chi/chi", "chi"),
    ("github.com/gorilla/mux", "gorilla"),
];

#[derive(Debug, Default)]
struct GoMod {
    module: Option<String>,
    go_version: Option<String>,
    requires: Vec<String>,
}

fn parse_go_mod(content: &str) -> GoMod {
    let mut parsed = GoMod::default();
    let mut in_require_block = false;

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block {
            if line == ")" {
                in_require_block = false;
            } else if let Some(path) = line.split_whitespace().next() {
                parsed.requires.push(path.to_string());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("module ") {
            parsed.module = Some(rest.trim().trim_matches('"').to_string());
        } else if let Some(rest) = line.strip_prefix("go ") {
            parsed.go_version = Some(rest.trim().to_string());
        } else if line.starts_with("require (") || line == "require(" {
            in_require_block = true;
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(path) = rest.split_whitespace().next() {
                parsed.requires.push(path.to_string());
            }
        }
    }

    parsed
}

pub struct GoProvider;

impl GoProvider {
    fn main_package(project: &ProjectFiles) -> Option<String> {
        if project.has_file("main.go") {
            return Some(".".to_string());
        }
        project
            .find_named_under("cmd", "main.go")
            .first()
            .and_then(|f| f.path.rsplit_once('/'))
            .map(|(dir, _)| format!("./{}", dir))
    }
}

impl Provider for GoProvider {
    fn name(&self) -> &str {
        "go"
    }

    fn language(&self) -> &str {
        "go"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let main_package = Self::main_package(&project);

        let Some(content) = project.read(ctx, "go.mod")? else {
            if main_package.as_deref() == Some(".") {
                return Ok(DetectResult::matched(self.name(), self.language(), 0.6)
                    .with_package_manager("go")
                    .with_build_tool("go")
                    .with_metadata("main_package", ".")
                    .with_evidence(
                        vec!["main.go".to_string()],
                        "main.go found without go.mod",
                    ));
            }
            return Ok(DetectResult::no_match());
        };

        let go_mod = parse_go_mod(&content);
        let mut evidence = vec!["go.mod".to_string()];
        evidence.extend(project.present(&["go.sum", "go.work", "main.go"]));

        let mut result = DetectResult::matched(self.name(), self.language(), 0.95)
            .with_package_manager("go")
            .with_build_tool("go");

        if let Some(version) = go_mod.go_version {
            result = result.with_version(version);
        }
        if let Some(module) = go_mod.module {
            result = result.with_metadata("module", module);
        }
        if let Some((_, framework)) = FRAMEWORKS
            .iter()
            .find(|(prefix, _)| go_mod.requires.iter().any(|r| r.starts_with(prefix)))
        {
            result = result.with_framework(*framework);
        }
        if let Some(pkg) = main_package {
            result = result.with_metadata("main_package", pkg);
        }
        if project.has_file("go.work") {
            result = result.with_metadata("workspace", "true");
        }
        if project.has_dir("vendor") {
            result = result.with_metadata("vendored", "true");
        }

        Ok(result.with_evidence(evidence, "Go module (go.mod)"))
    }

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands {
        let pkg = result.meta("main_package").unwrap_or(".");
        let mut build = Vec::new();
        if !options.offline && !result.meta_flag("vendored") {
            build.push("go mod download".to_string());
        }
        build.push(format!("go build -ldflags=\"-w -s\" -o out {}", pkg));

        Commands {
            dev: vec![format!("go run {}", pkg)],
            build,
            start: vec!["./out".to_string()],
        }
    }

    fn generate_environment(&self, _result: &DetectResult) -> BTreeMap<String, String> {
        env_map(&[("CGO_ENABLED", "0")])
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::Fixture;

    const GO_MOD: &str = r#"module github.com/acme/api

go 1.22

require (
    github.com/gin-gonic/gin v1.9.1 // indirect
    github.com/lib/pq v1.10.9
)
"#;

    #[test]
    fn test_parse_go_mod() {
        let parsed = parse_go_mod(GO_MOD);
        assert_eq!(parsed.module.as_deref(), Some("github.com/acme/api"));
        assert_eq!(parsed.go_version.as_deref(), Some("1.22"));
        assert_eq!(
            parsed.requires,
            vec!["github.com/gin-gonic/gin", "github.com/lib/pq"]
        );
    }

    #[test]
    fn test_parse_single_line_require() {
        let parsed = parse_go_mod("module x\nrequire github.com/labstack/echo/v4 v4.11.0\n");
        assert_eq!(parsed.requires, vec!["github.com/labstack/echo/v4"]);
    }

    #[test]
    fn test_detect_go_module() {
        let fixture = Fixture::new(&[
            ("go.mod", GO_MOD),
            ("go.sum", ""),
            ("main.go", "package main"),
        ]);
        let result = fixture.detect(&GoProvider);

        assert!(result.matched);
        assert_eq!(result.language, "go");
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.version, "1.22");
        assert_eq!(result.framework, "gin");
        assert_eq!(result.meta("main_package"), Some("."));
        assert_eq!(result.evidence.files, vec!["go.mod", "go.sum", "main.go"]);

        let commands = GoProvider.generate_commands(&result, &CommandOptions::default());
        assert_eq!(
            commands.build,
            vec!["go mod download", "go build -ldflags=\"-w -s\" -o out ."]
        );
        assert_eq!(commands.start, vec!["./out"]);
        assert!(!GoProvider.needs_native_compilation(&result));
    }

    #[test]
    fn test_cmd_layout() {
        let fixture = Fixture::new(&[
            ("go.mod", "module x\n\ngo 1.21\n"),
            ("cmd/server/main.go", "package main"),
        ]);
        let result = fixture.detect(&GoProvider);
        assert_eq!(result.meta("main_package"), Some("./cmd/server"));

        let commands = GoProvider.generate_commands(&result, &CommandOptions { offline: true });
        assert_eq!(
            commands.build,
            vec!["go build -ldflags=\"-w -s\" -o out ./cmd/server"]
        );
        assert_eq!(commands.dev, vec!["go run ./cmd/server"]);
    }

    #[test]
    fn test_main_go_without_module() {
        let fixture = Fixture::new(&[("main.go", "package main")]);
        let result = fixture.detect(&GoProvider);
        assert!(result.matched);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_no_go_files() {
        let fixture = Fixture::new(&[("package.json", "{}")]);
        assert!(!fixture.detect(&GoProvider).matched);
    }
}
