//! JVM provider for Maven and Gradle projects

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use regex::Regex;
use roxmltree::Document;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const GRADLE_BUILD_FILES: &[&str] = &["build.gradle.kts", "build.gradle"];

/// Group/artifact fragment to framework tag
const FRAMEWORKS: &[(&str, &str)] = &[
    ("spring-boot", "spring-boot"),
    ("org.springframework.boot", "spring-boot"),
    ("io.quarkus", "quarkus"),
    ("quarkus", "quarkus"),
    ("io.micronaut", "micronaut"),
    ("micronaut", "micronaut"),
];

pub struct JavaProvider;

struct PomInfo {
    java_version: Option<String>,
    framework: Option<&'static str>,
}

fn parse_pom(content: &str) -> Option<PomInfo> {
    let doc = Document::parse(content).ok()?;

    let mut java_version = None;
    let mut framework = None;

    for node in doc.descendants() {
        if java_version.is_none()
            && (node.has_tag_name("java.version")
                || node.has_tag_name("maven.compiler.release")
                || node.has_tag_name("maven.compiler.source"))
        {
            java_version = node.text().map(|t| t.trim().to_string());
        }

        if framework.is_none() && (node.has_tag_name("groupId") || node.has_tag_name("artifactId"))
        {
            if let Some(text) = node.text() {
                framework = FRAMEWORKS
                    .iter()
                    .find(|(needle, _)| text.contains(needle))
                    .map(|(_, fw)| *fw);
            }
        }
    }

    Some(PomInfo {
        java_version,
        framework,
    })
}

fn gradle_java_version(content: &str) -> Option<String> {
    let toolchain = Regex::new(r"JavaLanguageVersion\.of\(\s*(\d+)\s*\)").ok()?;
    if let Some(caps) = toolchain.captures(content) {
        return Some(caps[1].to_string());
    }

    let compat =
        Regex::new(r#"sourceCompatibility\s*=\s*['"]?(?:JavaVersion\.VERSION_)?([\d_.]+)"#).ok()?;
    compat
        .captures(content)
        .map(|caps| caps[1].replace('_', "."))
}

fn gradle_framework(content: &str) -> Option<&'static str> {
    FRAMEWORKS
        .iter()
        .find(|(needle, _)| needle.contains('.') && content.contains(needle))
        .map(|(_, fw)| *fw)
}

impl JavaProvider {
    fn build_tool(result: &DetectResult) -> &str {
        result.package_manager.as_deref().unwrap_or("maven")
    }

    fn executable(result: &DetectResult) -> String {
        match (Self::build_tool(result), result.meta_flag("wrapper")) {
            ("gradle", true) => "./gradlew".to_string(),
            ("gradle", false) => "gradle".to_string(),
            (_, true) => "./mvnw".to_string(),
            (_, false) => "mvn".to_string(),
        }
    }
}

impl Provider for JavaProvider {
    fn name(&self) -> &str {
        "java"
    }

    fn language(&self) -> &str {
        "java"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);

        if let Some(pom) = project.read(ctx, "pom.xml")? {
            let mut evidence = vec!["pom.xml".to_string()];
            let wrapper = project.has_file("mvnw");
            if wrapper {
                evidence.push("mvnw".to_string());
            }

            let (confidence, info) = match parse_pom(&pom) {
                Some(info) => (0.95, Some(info)),
                None => {
                    debug!("pom.xml could not be parsed");
                    (0.8, None)
                }
            };

            let mut result = DetectResult::matched(self.name(), self.language(), confidence)
                .with_package_manager("maven")
                .with_build_tool(if wrapper { "mvnw" } else { "maven" });
            if wrapper {
                result = result.with_metadata("wrapper", "true");
            }
            if let Some(info) = info {
                if let Some(version) = info.java_version {
                    result = result.with_version(version);
                }
                if let Some(framework) = info.framework {
                    result = result.with_framework(framework);
                }
            }
            return Ok(result.with_evidence(evidence, "Maven project (pom.xml)"));
        }

        if let Some(build_file) = project.first_of(GRADLE_BUILD_FILES) {
            let content = project.read(ctx, build_file)?.unwrap_or_default();
            let mut evidence = vec![build_file.to_string()];
            let wrapper = project.has_file("gradlew");
            if wrapper {
                evidence.push("gradlew".to_string());
            }
            if let Some(settings) = project.first_of(&["settings.gradle.kts", "settings.gradle"]) {
                evidence.push(settings.to_string());
            }

            let mut result = DetectResult::matched(self.name(), self.language(), 0.95)
                .with_package_manager("gradle")
                .with_build_tool(if wrapper { "gradlew" } else { "gradle" });
            if wrapper {
                result = result.with_metadata("wrapper", "true");
            }
            if build_file.ends_with(".kts") {
                result = result.with_metadata("kotlin_dsl", "true");
            }
            if let Some(version) = gradle_java_version(&content) {
                result = result.with_version(version);
            }
            if let Some(framework) = gradle_framework(&content) {
                result = result.with_framework(framework);
            }
            return Ok(result.with_evidence(evidence, format!("Gradle project ({})", build_file)));
        }

        Ok(DetectResult::no_match())
    }

    fn generate_commands(&self, result: &DetectResult, options: &CommandOptions) -> Commands {
        let exe = Self::executable(result);
        let gradle = Self::build_tool(result) == "gradle";

        let build = match (gradle, options.offline) {
            (true, false) => format!("{} build -x test", exe),
            (true, true) => format!("{} build -x test --offline", exe),
            (false, false) => format!("{} -DskipTests package", exe),
            (false, true) => format!("{} -o -DskipTests package", exe),
        };

        let jar = if gradle {
            "build/libs/*.jar"
        } else {
            "target/*.jar"
        };
        let start = match result.framework.as_str() {
            "quarkus" if gradle => "java -jar build/quarkus-app/quarkus-run.jar".to_string(),
            "quarkus" => "java -jar target/quarkus-app/quarkus-run.jar".to_string(),
            _ => format!("java $JAVA_OPTS -jar {}", jar),
        };

        let dev = match (result.framework.as_str(), gradle) {
            ("spring-boot", true) => format!("{} bootRun", exe),
            ("spring-boot", false) => format!("{} spring-boot:run", exe),
            ("quarkus", true) => format!("{} quarkusDev", exe),
            ("quarkus", false) => format!("{} quarkus:dev", exe),
            _ => start.clone(),
        };

        Commands {
            dev: vec![dev],
            build: vec![build],
            start: vec![start],
        }
    }

    fn generate_environment(&self, _result: &DetectResult) -> BTreeMap<String, String> {
        env_map(&[("JAVA_OPTS", "-XX:MaxRAMPercentage=75.0")])
    }

    fn needs_native_compilation(&self, _result: &DetectResult) -> bool {
        false
    }

    fn excluded_dirs(&self) -> &[&str] {
        &[".gradle", ".mvn"]
    }
}
