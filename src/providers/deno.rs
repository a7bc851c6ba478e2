//! Deno provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const CONFIG_FILES: &[&str] = &["deno.json", "deno.jsonc"];
/// Deno module conventions that identify a project without a config file
const MODULE_MARKERS: &[&str] = &["deps.ts", "mod.ts"];
/// Entrypoint candidates, only trusted once a Deno marker is present
const ENTRYPOINTS: &[&str] = &["main.ts", "mod.ts", "server.ts", "main.js"];

pub struct DenoProvider;

/// Drops `//` line comments so simple deno.jsonc files parse as JSON
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Provider for DenoProvider {
    fn name(&self) -> &str {
        "deno"
    }

    fn language(&self) -> &str {
        "deno"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let config_file = project.first_of(CONFIG_FILES);
        let marker = project.first_of(MODULE_MARKERS);

        let (mut result, entrypoint) = match (config_file, marker) {
            (Some(file), _) => (
                DetectResult::matched(self.name(), self.language(), 0.95)
                    .with_evidence(vec![file.to_string()], format!("{} found", file)),
                project.first_of(ENTRYPOINTS),
            ),
            (None, Some(marker)) if !project.has_file("package.json") => (
                DetectResult::matched(self.name(), self.language(), 0.6).with_evidence(
                    vec![marker.to_string()],
                    format!("{} found without package.json", marker),
                ),
                project.first_of(&["mod.ts"]),
            ),
            _ => return Ok(DetectResult::no_match()),
        };
        result = result.with_build_tool("deno");

        if let Some(entry) = entrypoint {
            result = result.with_metadata("entrypoint", entry);
        }

        if let Some(file) = config_file {
            if let Some(content) = project.read(ctx, file)? {
                let config: Option<Value> = serde_json::from_str(&strip_line_comments(&content)).ok();
                if let Some(tasks) = config
                    .as_ref()
                    .and_then(|c| c.get("tasks"))
                    .and_then(|t| t.as_object())
                {
                    for task in ["start", "dev", "build"] {
                        if tasks.contains_key(task) {
                            result = result.with_metadata(&format!("task_{}", task), "true");
                        }
                    }
                }
            }
        }

        if project.has_file("deno.lock") {
            result.evidence.files.push("deno.lock".to_string());
        }

        Ok(result)
    }

    fn generate_commands(&self, result: &DetectResult, _options: &CommandOptions) -> Commands {
        let entry = result.meta("entrypoint").unwrap_or("main.ts");
        let has_task = |name: &str| result.meta_flag(&format!("task_{}", name));

        let mut build = vec![format!("deno cache {}", entry)];
        if has_task("build") {
            build.push("deno task build".to_string());
        }

        let start = if has_task("start") {
            "deno task start".to_string()
        } else {
            format!("deno run --allow-all {}", entry)
        };
        let dev = if has_task("dev") {
            "deno task dev".to_string()
        } else {
            format!("deno run --allow-all --watch {}", entry)
        };

        Commands {
            dev: vec![dev],
            build,
            start: vec![start],
        }
    }

    fn generate_environment(&self, _result: &DetectResult) -> BTreeMap<String, String> {
        env_map(&[("DENO_NO_UPDATE_CHECK", "1")])
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
    fn test_deno_json_with_tasks() {
        let fixture = Fixture::new(&[
            (
                "deno.jsonc",
                "{\n  // tasks\n  \"tasks\": {\"start\": \"deno run -A main.ts\", \"dev\": \"deno run -A --watch main.ts\"}\n}",
            ),
            ("main.ts", ""),
            ("deno.lock", ""),
        ]);
        let result = fixture.detect(&DenoProvider);

        assert!(result.matched);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.evidence.files, vec!["deno.jsonc", "deno.lock"]);

        let commands = DenoProvider.generate_commands(&result, &CommandOptions::default());
        assert_eq!(commands.build, vec!["deno cache main.ts"]);
        assert_eq!(commands.start, vec!["deno task start"]);
        assert_eq!(commands.dev, vec!["deno task dev"]);
    }

    #[test]
    fn test_entrypoint_without_config() {
        let fixture = Fixture::new(&[("mod.ts", "export {}")]);
        let result = fixture.detect(&DenoProvider);
        assert_eq!(result.confidence, 0.6);

        let commands = DenoProvider.generate_commands(&result, &CommandOptions::default());
        assert_eq!(commands.start, vec!["deno run --allow-all mod.ts"]);
    }

    #[test]
    fn test_deps_file_without_config() {
        let fixture = Fixture::new(&[("deps.ts", "export {}"), ("server.ts", "")]);
        let result = fixture.detect(&DenoProvider);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.evidence.files, vec!["deps.ts"]);
        assert_eq!(result.meta("entrypoint"), None);
    }

    #[test]
    fn test_plain_scripts_are_not_deno() {
        for entries in [
            vec![("main.js", "console.log(1)")],
            vec![("main.ts", ""), ("server.ts", "")],
            vec![("index.html", "<html></html>"), ("main.js", "")],
        ] {
            let fixture = Fixture::new(&entries);
            assert!(!fixture.detect(&DenoProvider).matched, "{:?}", entries);
        }
    }

    #[test]
    fn test_node_project_is_not_deno() {
        let fixture = Fixture::new(&[("package.json", "{}"), ("main.ts", "")]);
        assert!(!fixture.detect(&DenoProvider).matched);
    }
}
