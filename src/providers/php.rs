//! PHP provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub struct PhpProvider;

/// "^8.2" / ">=8.1 <8.4" / "~7.4.0" -> "8.2" / "8.1" / "7.4.0"
fn php_version(composer: &Value) -> Option<String> {
    let constraint = composer.get("require")?.get("php")?.as_str()?;
    let version: String = constraint
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let version = version.trim_end_matches('.');
    (!version.is_empty()).then(|| version.to_string())
}

fn requires(composer: &Value, package: &str) -> bool {
    ["require", "require-dev"].iter().any(|key| {
        composer
            .get(key)
            .and_then(|r| r.as_object())
            .is_some_and(|r| r.contains_key(package))
    })
}

impl Provider for PhpProvider {
    fn name(&self) -> &str {
        "php"
    }

    fn language(&self) -> &str {
        "php"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let composer_json = project.read(ctx, "composer.json")?;
        let index = project.first_of(&["index.php", "public/index.php"]);

        if composer_json.is_none() && index.is_none() {
            return Ok(DetectResult::no_match());
        }

        let composer: Option<Value> = composer_json
            .as_deref()
            .and_then(|c| serde_json::from_str(c).ok());

        let mut evidence = Vec::new();
        let confidence = if composer_json.is_some() {
            evidence.push("composer.json".to_string());
            if project.has_file("composer.lock") {
                evidence.push("composer.lock".to_string());
                0.95
            } else {
                0.9
            }
        } else {
            0.6
        };
        if let Some(index) = index {
            evidence.push(index.to_string());
        }

        let mut result = DetectResult::matched(self.name(), self.language(), confidence);
        if composer_json.is_some() {
            result = result
                .with_package_manager("composer")
                .with_build_tool("composer");
        }

        let framework = if project.has_file("artisan")
            || composer
                .as_ref()
                .is_some_and(|c| requires(c, "laravel/framework"))
        {
            Some("laravel")
        } else if project.has_file("symfony.lock")
            || composer
                .as_ref()
                .is_some_and(|c| requires(c, "symfony/framework-bundle"))
        {
            Some("symfony")
        } else {
            None
        };
        if let Some(framework) = framework {
            result = result.with_framework(framework);
        }

        if let Some(version) = composer.as_ref().and_then(php_version) {
            result = result.with_version(version);
        }

        if project.has_file("public/index.php") {
            result = result.with_metadata("document_root", "public");
        }

        Ok(result.with_evidence(evidence, "PHP project detected"))
    }

    fn generate_commands(&self, result: &DetectResult, _options: &CommandOptions) -> Commands {
        let mut build = Vec::new();
        if result.package_manager.as_deref() == Some("composer") {
            build.push(
                "composer install --no-dev --optimize-autoloader --no-interaction".to_string(),
            );
        }

        let (dev, start) = match result.framework.as_str() {
            "laravel" => {
                build.push("php artisan optimize".to_string());
                (
                    "php artisan serve --host=0.0.0.0 --port=8000".to_string(),
                    "php artisan migrate --force && php artisan serve --host=0.0.0.0 --port=8000"
                        .to_string(),
                )
            }
            _ => {
                let server = match result.meta("document_root") {
                    Some(root) => format!("php -S 0.0.0.0:8000 -t {}", root),
                    None => "php -S 0.0.0.0:8000".to_string(),
                };
                (server.clone(), server)
            }
        };

        Commands {
            dev: vec![dev],
            build,
            start: vec![start],
        }
    }

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String> {
        let mut env = env_map(&[("COMPOSER_ALLOW_SUPERUSER", "1")]);
        match result.framework.as_str() {
            "laravel" => {
                env.insert("APP_ENV".to_string(), "production".to_string());
                env.insert("LOG_CHANNEL".to_string(), "stderr".to_string());
            }
            "symfony" => {
                env.insert("APP_ENV".to_string(), "prod".to_string());
            }
            _ => {}
        }
        env
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        false
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["vendor"]
    }
}
