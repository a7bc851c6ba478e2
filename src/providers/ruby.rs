//! Ruby provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Gems with C extensions
const NATIVE_GEMS: &[&str] = &["nokogiri", "pg", "mysql2", "sqlite3", "bcrypt", "ffi"];

pub struct RubyProvider;

fn gem_names(gemfile: &str) -> HashSet<String> {
    let Ok(re) = Regex::new(r#"(?m)^\s*gem\s+['"]([A-Za-z0-9_.-]+)['"]"#) else {
        return HashSet::new();
    };
    re.captures_iter(gemfile)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn gemfile_ruby_version(gemfile: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^\s*ruby\s+['"]([\d.]+)['"]"#).ok()?;
    re.captures(gemfile).map(|caps| caps[1].to_string())
}

impl Provider for RubyProvider {
    fn name(&self) -> &str {
        "ruby"
    }

    fn language(&self) -> &str {
        "ruby"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let gemfile = project.read(ctx, "Gemfile")?;
        let has_rackup = project.has_file("config.ru");

        if gemfile.is_none() && !has_rackup {
            return Ok(DetectResult::no_match());
        }

        let gems = gemfile.as_deref().map(gem_names).unwrap_or_default();

        let mut evidence = Vec::new();
        let confidence = match &gemfile {
            Some(_) => {
                evidence.push("Gemfile".to_string());
                if project.has_file("Gemfile.lock") {
                    evidence.push("Gemfile.lock".to_string());
                    0.95
                } else {
                    0.9
                }
            }
            None => 0.6,
        };
        if has_rackup {
            evidence.push("config.ru".to_string());
        }

        let mut result = DetectResult::matched(self.name(), self.language(), confidence);
        if gemfile.is_some() {
            result = result
                .with_package_manager("bundler")
                .with_build_tool("bundler");
        }
        if has_rackup {
            result = result.with_metadata("rackup", "true");
        }

        if project.has_file("config/application.rb") || gems.contains("rails") {
            result = result.with_framework("rails");
            if project.has_file("config/application.rb") {
                evidence.push("config/application.rb".to_string());
            }
        } else if gems.contains("sinatra") {
            result = result.with_framework("sinatra");
        }

        let native: Vec<&str> = NATIVE_GEMS
            .iter()
            .copied()
            .filter(|g| gems.contains(*g))
            .collect();
        if !native.is_empty() {
            result = result.with_metadata("native_deps", native.join(","));
        }

        let mut version = None;
        if let Some(content) = project.read(ctx, ".ruby-version")? {
            let trimmed = content.trim().trim_start_matches("ruby-").to_string();
            if !trimmed.is_empty() {
                evidence.push(".ruby-version".to_string());
                version = Some(trimmed);
            }
        }
        if version.is_none() {
            version = gemfile.as_deref().and_then(gemfile_ruby_version);
        }
        if let Some(version) = version {
            result = result.with_version(version);
        }

        if let Some(entry) = project.first_of(&["app.rb", "main.rb"]) {
            result = result.with_metadata("entrypoint", entry);
        }

        Ok(result.with_evidence(evidence, "Ruby project detected"))
    }

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands {
        let mut build = Vec::new();
        if result.package_manager.is_some() {
            build.push(if options.offline {
                "bundle install --local".to_string()
            } else {
                "bundle install".to_string()
            });
        }

        let entry = result.meta("entrypoint").unwrap_or("app.rb");
        let (dev, start) = match result.framework.as_str() {
            "rails" => {
                build.push("bundle exec rake assets:precompile".to_string());
                (
                    "bin/rails server -b 0.0.0.0".to_string(),
                    "bundle exec rails db:prepare && bundle exec rails server -b 0.0.0.0"
                        .to_string(),
                )
            }
            _ if result.meta_flag("rackup") => {
                let cmd = "bundle exec rackup --host 0.0.0.0 --port 9292".to_string();
                (cmd.clone(), cmd)
            }
            _ => {
                let cmd = format!("bundle exec ruby {}", entry);
                (cmd.clone(), cmd)
            }
        };

        Commands {
            dev: vec![dev],
            build,
            start: vec![start],
        }
    }

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String> {
        let mut env = env_map(&[
            ("BUNDLE_WITHOUT", "development:test"),
            ("RACK_ENV", "production"),
        ]);
        if result.framework == "rails" {
            env.extend(env_map(&[
                ("RAILS_ENV", "production"),
                ("RAILS_LOG_TO_STDOUT", "enabled"),
                ("RAILS_SERVE_STATIC_FILES", "true"),
            ]));
        }
        env
    }

    fn needs_native_compilation(&self, result: &DetectResult) -> bool {
        result.meta("native_deps").is_some()
    }

    fn excluded_dirs(&self) -> &[&str] {
        &[".bundle"]
    }
}
