//! Shell script provider

use super::{CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

const SCRIPTS: &[(&str, f64)] = &[("start.sh", 0.5), ("entrypoint.sh", 0.4), ("run.sh", 0.4)];

pub struct ShellProvider;

/// Interpreter named by the shebang line, defaulting to `sh`
fn interpreter(content: &str) -> String {
    let Some(shebang) = content.lines().next().and_then(|l| l.strip_prefix("#!")) else {
        return "sh".to_string();
    };
    let mut parts = shebang.split_whitespace();
    let program = parts.next().unwrap_or("sh");
    let name = program.rsplit('/').next().unwrap_or(program);
    if name == "env" {
        parts.next().unwrap_or("sh").to_string()
    } else {
        name.to_string()
    }
}

impl Provider for ShellProvider {
    fn name(&self) -> &str {
        "shell"
    }

    fn language(&self) -> &str {
        "shell"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let Some((script, confidence)) = SCRIPTS.iter().find(|(s, _)| project.has_file(s)) else {
            return Ok(DetectResult::no_match());
        };

        let content = project.read(ctx, script)?.unwrap_or_default();
        let shell = interpreter(&content);

        Ok(DetectResult::matched(self.name(), self.language(), *confidence)
            .with_metadata("script", *script)
            .with_metadata("interpreter", shell.clone())
            .with_build_tool(shell)
            .with_evidence(vec![script.to_string()], format!("{} found", script)))
    }

    fn generate_commands(&self, result: &DetectResult, _options: &CommandOptions) -> Commands {
        let script = result.meta("script").unwrap_or("start.sh");
        let shell = result.meta("interpreter").unwrap_or("sh");
        let run = format!("{} {}", shell, script);

        Commands {
            dev: vec![run.clone()],
            build: vec![format!("chmod +x {}", script)],
            start: vec![run],
        }
    }

    fn generate_environment(&self, _result: &DetectResult) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        false
    }
}
