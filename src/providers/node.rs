//! Node.js provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
    ("package-lock.json", "npm"),
];

/// Dependency name to framework tag, most specific first
const FRAMEWORKS: &[(&str, &str)] = &[
    ("next", "nextjs"),
    ("nuxt", "nuxt"),
    ("@remix-run/node", "remix"),
    ("astro", "astro"),
    ("@nestjs/core", "nestjs"),
    ("express", "express"),
    ("fastify", "fastify"),
    ("koa", "koa"),
    ("vite", "vite"),
    ("react-scripts", "create-react-app"),
    ("react", "react"),
];

const NATIVE_PACKAGES: &[&str] = &[
    "bcrypt",
    "sharp",
    "canvas",
    "sqlite3",
    "better-sqlite3",
    "argon2",
    "node-gyp",
];

pub struct NodeProvider;

impl NodeProvider {
    fn dependency_names(manifest: &Value) -> Vec<String> {
        ["dependencies", "devDependencies", "optionalDependencies"]
            .iter()
            .filter_map(|key| manifest.get(key).and_then(|v| v.as_object()))
            .flat_map(|deps| deps.keys().cloned())
            .collect()
    }

    fn package_manager_field(manifest: &Value) -> Option<String> {
        let field = manifest.get("packageManager")?.as_str()?;
        let name = field.split('@').next()?.trim();
        match name {
            "npm" | "pnpm" | "yarn" | "bun" => Some(name.to_string()),
            _ => None,
        }
    }

    fn engines_version(manifest: &Value) -> Option<String> {
        let raw = manifest.get("engines")?.get("node")?.as_str()?;
        clean_version(raw)
    }

    fn run_script(package_manager: &str, script: &str) -> String {
        match package_manager {
            "npm" => format!("npm run {}", script),
            other => format!("{} run {}", other, script),
        }
    }

    fn install_command(result: &DetectResult, offline: bool) -> String {
        let pm = result.package_manager.as_deref().unwrap_or("npm");
        let locked = result.meta("lockfile").is_some();
        match (pm, offline) {
            ("pnpm", false) => "pnpm install --frozen-lockfile".to_string(),
            ("pnpm", true) => "pnpm install --frozen-lockfile --offline".to_string(),
            ("yarn", false) => "yarn install --frozen-lockfile".to_string(),
            ("yarn", true) => "yarn install --frozen-lockfile --offline".to_string(),
            ("bun", _) => "bun install".to_string(),
            (_, false) if locked => "npm ci".to_string(),
            (_, true) if locked => "npm ci --prefer-offline".to_string(),
            (_, false) => "npm install".to_string(),
            (_, true) => "npm install --prefer-offline".to_string(),
        }
    }
}

/// "^18.17.0" / ">=20" / "v20.1" -> "18.17.0" / "20" / "20.1"
fn clean_version(raw: &str) -> Option<String> {
    let version: String = raw
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let version = version.trim_end_matches('.').to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

impl Provider for NodeProvider {
    fn name(&self) -> &str {
        "node"
    }

    fn language(&self) -> &str {
        "javascript"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let Some(content) = project.read(ctx, "package.json")? else {
            return Ok(DetectResult::no_match());
        };

        let mut evidence = vec!["package.json".to_string()];
        let mut confidence = 0.9;
        let manifest: Option<Value> = match serde_json::from_str(&content) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "package.json is not valid JSON");
                confidence = 0.7;
                None
            }
        };

        let lockfile = LOCKFILES.iter().find(|(file, _)| project.has_file(file));
        let package_manager = match (lockfile, manifest.as_ref()) {
            (Some((file, pm)), _) => {
                evidence.push(file.to_string());
                confidence = if manifest.is_some() { 0.95 } else { 0.75 };
                pm.to_string()
            }
            (None, Some(m)) => Self::package_manager_field(m).unwrap_or_else(|| "npm".to_string()),
            (None, None) => "npm".to_string(),
        };

        let mut result = DetectResult::matched(self.name(), self.language(), confidence)
            .with_package_manager(package_manager.clone())
            .with_build_tool(package_manager);

        if let Some((file, _)) = lockfile {
            result = result.with_metadata("lockfile", *file);
        }

        if let Some(manifest) = manifest.as_ref() {
            let deps = Self::dependency_names(manifest);
            if let Some((_, framework)) = FRAMEWORKS
                .iter()
                .find(|(dep, _)| deps.iter().any(|d| d == dep))
            {
                result = result.with_framework(*framework);
            }

            let native: Vec<&str> = NATIVE_PACKAGES
                .iter()
                .copied()
                .filter(|p| deps.iter().any(|d| d == p))
                .collect();
            if !native.is_empty() {
                result = result.with_metadata("native_deps", native.join(","));
            }

            if let Some(scripts) = manifest.get("scripts").and_then(|s| s.as_object()) {
                for script in ["dev", "build", "start"] {
                    if scripts.contains_key(script) {
                        result = result.with_metadata(&format!("script_{}", script), "true");
                    }
                }
            }

            if let Some(main) = manifest.get("main").and_then(|m| m.as_str()) {
                result = result.with_metadata("main", main);
            }

            if let Some(version) = Self::engines_version(manifest) {
                result = result.with_version(version);
            }
        }

        if result.version.is_empty() {
            if let Some(file) = project.first_of(&[".nvmrc", ".node-version"]) {
                if let Some(version) = project.read(ctx, file)?.as_deref().and_then(clean_version) {
                    evidence.push(file.to_string());
                    result = result.with_version(version);
                }
            }
        }

        if project.has_file("tsconfig.json") {
            evidence.push("tsconfig.json".to_string());
            result = result
                .with_metadata("typescript", "true")
                .with_build_tool("typescript");
        }

        let reason = if result.has_framework() {
            format!("package.json declares {} project", result.framework)
        } else {
            "package.json found".to_string()
        };
        Ok(result.with_evidence(evidence, reason))
    }

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands {
        let pm = result.package_manager.as_deref().unwrap_or("npm");
        let has_script = |name: &str| result.meta_flag(&format!("script_{}", name));
        let main = result.meta("main").unwrap_or("index.js");

        let mut build = vec![Self::install_command(result, options.offline)];
        if has_script("build") {
            build.push(Self::run_script(pm, "build"));
        }

        let start = if has_script("start") {
            vec![Self::run_script(pm, "start")]
        } else if result.framework == "nextjs" {
            vec!["npx next start".to_string()]
        } else {
            vec![format!("node {}", main)]
        };

        let dev = if has_script("dev") {
            vec![Self::run_script(pm, "dev")]
        } else {
            start.clone()
        };

        Commands { dev, build, start }
    }

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String> {
        let mut env = env_map(&[
            ("NODE_ENV", "production"),
            ("NPM_CONFIG_UPDATE_NOTIFIER", "false"),
            ("NPM_CONFIG_FUND", "false"),
        ]);
        if result.framework == "nextjs" {
            env.insert("NEXT_TELEMETRY_DISABLED".to_string(), "1".to_string());
        }
        env
    }

    fn needs_native_compilation(&self, result: &DetectResult) -> bool {
        result.meta("native_deps").is_some()
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["node_modules", ".next", ".nuxt", ".turbo"]
    }
}
