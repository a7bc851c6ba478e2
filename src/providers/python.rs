//! Python provider

use super::{env_map, CommandOptions, Commands, DetectResult, ProjectFiles, Provider};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use anyhow::Result;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

const MANIFESTS: &[&str] = &["pyproject.toml", "requirements.txt", "Pipfile", "setup.py"];
const LOCKFILES: &[&str] = &["poetry.lock", "uv.lock", "Pipfile.lock"];
const ENTRYPOINTS: &[&str] = &["main.py", "app.py", "server.py", "wsgi.py"];

/// Packages whose builds need a C toolchain when no wheel is available
const NATIVE_PACKAGES: &[&str] = &[
    "psycopg2",
    "mysqlclient",
    "numpy",
    "pandas",
    "lxml",
    "cryptography",
];

pub struct PythonProvider;

impl PythonProvider {
    fn package_manager(project: &ProjectFiles, pyproject: Option<&str>) -> &'static str {
        if project.has_file("poetry.lock")
            || pyproject.is_some_and(|c| c.contains("[tool.poetry]"))
        {
            "poetry"
        } else if project.has_file("uv.lock") || pyproject.is_some_and(|c| c.contains("[tool.uv]"))
        {
            "uv"
        } else if project.has_file("Pipfile") {
            "pipenv"
        } else {
            "pip"
        }
    }

    fn framework(project: &ProjectFiles, deps: &HashSet<String>) -> Option<&'static str> {
        if project.has_file("manage.py") || deps.contains("django") {
            Some("django")
        } else if deps.contains("fastapi") {
            Some("fastapi")
        } else if deps.contains("flask") {
            Some("flask")
        } else if deps.contains("streamlit") {
            Some("streamlit")
        } else {
            None
        }
    }

    fn run_prefix(result: &DetectResult) -> &'static str {
        match result.package_manager.as_deref() {
            Some("poetry") => "poetry run ",
            Some("uv") => "uv run ",
            Some("pipenv") => "pipenv run ",
            _ => "",
        }
    }

    fn install_commands(result: &DetectResult) -> Vec<String> {
        match result.package_manager.as_deref() {
            Some("poetry") => vec!["poetry install --no-interaction --no-root".to_string()],
            Some("uv") => vec!["uv sync --frozen".to_string()],
            Some("pipenv") => vec!["pipenv install --deploy".to_string()],
            _ if result.meta_flag("requirements") => {
                vec!["pip install -r requirements.txt".to_string()]
            }
            _ => vec!["pip install .".to_string()],
        }
    }
}

/// Lowercased tokens of dependency declarations
///
/// Splitting on anything that cannot appear in a distribution name turns
/// `Django>=4.2`, `"fastapi[all]"` and `flask = "^3"` into bare names.
fn dependency_tokens(sources: &[&str]) -> HashSet<String> {
    sources
        .iter()
        .flat_map(|s| {
            s.split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        })
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

fn version_from_pyproject(content: &str) -> Option<String> {
    let parsed: toml::Value = toml::from_str(content).ok()?;
    let requires = parsed
        .get("project")
        .and_then(|p| p.get("requires-python"))
        .or_else(|| {
            parsed
                .get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("dependencies"))
                .and_then(|d| d.get("python"))
        })?
        .as_str()?;
    clean_version(requires)
}

fn clean_version(raw: &str) -> Option<String> {
    let version: String = raw
        .trim()
        .trim_start_matches("python-")
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let version = version.trim_end_matches('.');
    (!version.is_empty()).then(|| version.to_string())
}

impl Provider for PythonProvider {
    fn name(&self) -> &str {
        "python"
    }

    fn language(&self) -> &str {
        "python"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn detect(
        &self,
        _project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<DetectResult> {
        let project = ProjectFiles::new(files);
        let manifests = project.present(MANIFESTS);
        let entrypoint = project.first_of(ENTRYPOINTS);

        if manifests.is_empty() && entrypoint.is_none() {
            return Ok(DetectResult::no_match());
        }

        let requirements = project.read(ctx, "requirements.txt")?;
        let pyproject = project.read(ctx, "pyproject.toml")?;
        let pipfile = project.read(ctx, "Pipfile")?;
        let deps = dependency_tokens(
            &[&requirements, &pyproject, &pipfile]
                .iter()
                .filter_map(|c| c.as_deref())
                .collect::<Vec<_>>(),
        );

        let lockfiles = project.present(LOCKFILES);
        let confidence = if manifests.is_empty() {
            0.5
        } else if lockfiles.is_empty() {
            0.9
        } else {
            0.95
        };

        let package_manager = Self::package_manager(&project, pyproject.as_deref());
        let mut evidence: Vec<String> = manifests.iter().chain(lockfiles.iter()).cloned().collect();

        let mut result = DetectResult::matched(self.name(), self.language(), confidence)
            .with_package_manager(package_manager)
            .with_build_tool(package_manager);

        if requirements.is_some() {
            result = result.with_metadata("requirements", "true");
        }

        if let Some(framework) = Self::framework(&project, &deps) {
            result = result.with_framework(framework);
            if framework == "django" && project.has_file("manage.py") {
                evidence.push("manage.py".to_string());
            }
        }

        let entry = if result.framework == "django" {
            Some("manage.py")
        } else {
            entrypoint
        };
        if let Some(entry) = entry {
            result = result.with_metadata("entrypoint", entry);
            if manifests.is_empty() {
                evidence.push(entry.to_string());
            }
        }

        let native: Vec<&str> = NATIVE_PACKAGES
            .iter()
            .copied()
            .filter(|p| deps.contains(*p))
            .collect();
        if !native.is_empty() {
            result = result.with_metadata("native_deps", native.join(","));
        }

        let mut version = None;
        if let Some(file) = project.first_of(&[".python-version", "runtime.txt"]) {
            version = project.read(ctx, file)?.as_deref().and_then(clean_version);
            if version.is_some() {
                evidence.push(file.to_string());
            }
        }
        if version.is_none() {
            version = pyproject.as_deref().and_then(version_from_pyproject);
        }
        if let Some(version) = version {
            result = result.with_version(version);
        }

        debug!(
            package_manager,
            framework = %result.framework,
            "Python project detected"
        );

        let reason = if manifests.is_empty() {
            "Python entrypoint found without dependency manifest".to_string()
        } else {
            format!("Python dependency manifest found ({})", manifests.join(", "))
        };
        Ok(result.with_evidence(evidence, reason))
    }

    fn generate_commands(&self, result: &DetectResult, _options: &CommandOptions) -> Commands {
        let run = Self::run_prefix(result);
        let entry = result.meta("entrypoint").unwrap_or("main.py");
        let module = entry.trim_end_matches(".py");

        let (dev, start) = match result.framework.as_str() {
            "django" => (
                format!("{}python manage.py runserver 0.0.0.0:8000", run),
                format!(
                    "{}python manage.py migrate && {}python manage.py runserver 0.0.0.0:8000 --noreload",
                    run, run
                ),
            ),
            "fastapi" => (
                format!("{}uvicorn {}:app --reload --host 0.0.0.0 --port 8000", run, module),
                format!("{}uvicorn {}:app --host 0.0.0.0 --port 8000", run, module),
            ),
            "flask" => (
                format!("{}flask --app {} run --debug --host 0.0.0.0", run, module),
                format!("{}flask --app {} run --host 0.0.0.0", run, module),
            ),
            "streamlit" => (
                format!("{}streamlit run {}", run, entry),
                format!("{}streamlit run {} --server.headless true", run, entry),
            ),
            _ => (
                format!("{}python {}", run, entry),
                format!("{}python {}", run, entry),
            ),
        };

        Commands {
            dev: vec![dev],
            build: Self::install_commands(result),
            start: vec![start],
        }
    }

    fn generate_environment(&self, result: &DetectResult) -> BTreeMap<String, String> {
        let mut env = env_map(&[
            ("PYTHONUNBUFFERED", "1"),
            ("PYTHONDONTWRITEBYTECODE", "1"),
            ("PIP_DISABLE_PIP_VERSION_CHECK", "1"),
        ]);
        if result.package_manager.as_deref() == Some("poetry") {
            env.insert("POETRY_VIRTUALENVS_IN_PROJECT".to_string(), "true".to_string());
        }
        env
    }

    fn needs_native_compilation(&self, result: &DetectResult) -> bool {
        result.meta("native_deps").is_some()
    }

    fn excluded_dirs(&self) -> &[&str] {
        &["__pycache__", ".venv", "venv", ".tox", ".mypy_cache", ".pytest_cache"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::Fixture;
    use yare::parameterized;

    #[test]
    fn test_no_python_files() {
        let fixture = Fixture::new(&[("go.mod", "module x")]);
        assert!(!fixture.detect(&PythonProvider).matched);
    }

    #[test]
    fn test_requirements_flask() {
        let fixture = Fixture::new(&[
            ("requirements.txt", "Flask==3.0.0\ngunicorn>=21\n"),
            ("app.py", "from flask import Flask"),
            (".python-version", "3.12.1\n"),
        ]);
        let result = fixture.detect(&PythonProvider);

        assert!(result.matched);
        assert_eq!(result.language, "python");
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.framework, "flask");
        assert_eq!(result.version, "3.12.1");
        assert_eq!(result.package_manager.as_deref(), Some("pip"));
        assert_eq!(result.meta("entrypoint"), Some("app.py"));

        let commands = PythonProvider.generate_commands(&result, &CommandOptions::default());
        assert_eq!(commands.build, vec!["pip install -r requirements.txt"]);
        assert_eq!(commands.start, vec!["flask --app app run --host 0.0.0.0"]);
    }

    #[test]
    fn test_poetry_fastapi() {
        let fixture = Fixture::new(&[
            (
                "pyproject.toml",
                "[tool.poetry]\nname = \"api\"\n\n[tool.poetry.dependencies]\npython = \"^3.11\"\nfastapi = \"^0.110\"\n",
            ),
            ("poetry.lock", ""),
            ("main.py", ""),
        ]);
        let result = fixture.detect(&PythonProvider);

        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.framework, "fastapi");
        assert_eq!(result.version, "3.11");
        assert_eq!(result.package_manager.as_deref(), Some("poetry"));

        let commands = PythonProvider.generate_commands(&result, &CommandOptions::default());
        assert_eq!(commands.build, vec!["poetry install --no-interaction --no-root"]);
        assert_eq!(
            commands.start,
            vec!["poetry run uvicorn main:app --host 0.0.0.0 --port 8000"]
        );

        let env = PythonProvider.generate_environment(&result);
        assert!(env.contains_key("POETRY_VIRTUALENVS_IN_PROJECT"));
    }

    #[test]
    fn test_django_via_manage_py() {
        let fixture = Fixture::new(&[
            ("requirements.txt", "psycopg2==2.9\n"),
            ("manage.py", ""),
        ]);
        let result = fixture.detect(&PythonProvider);

        assert_eq!(result.framework, "django");
        assert_eq!(result.meta("entrypoint"), Some("manage.py"));
        assert!(result.evidence.files.contains(&"manage.py".to_string()));
        assert!(PythonProvider.needs_native_compilation(&result));
    }

    #[test]
    fn test_entrypoint_only_low_confidence() {
        let fixture = Fixture::new(&[("main.py", "print('hi')")]);
        let result = fixture.detect(&PythonProvider);

        assert!(result.matched);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.evidence.files, vec!["main.py"]);
        assert!(!PythonProvider.needs_native_compilation(&result));
    }

    #[parameterized(
        uv = { &[("pyproject.toml", "[project]\nname = \"x\"\n"), ("uv.lock", "")], "uv" },
        pipenv = { &[("Pipfile", "[packages]\nrequests = \"*\"\n")], "pipenv" },
        pip = { &[("setup.py", "from setuptools import setup")], "pip" },
    )]
    fn test_package_manager(entries: &[(&str, &str)], expected: &str) {
        let fixture = Fixture::new(entries);
        let result = fixture.detect(&PythonProvider);
        assert_eq!(result.package_manager.as_deref(), Some(expected));
    }

    #[test]
    fn test_binary_wheel_is_not_native() {
        let tokens = dependency_tokens(&["psycopg2-binary==2.9.9\n"]);
        assert!(tokens.contains("psycopg2-binary"));
        assert!(!tokens.contains("psycopg2"));
    }

    #[test]
    fn test_version_from_requires_python() {
        let content = "[project]\nname = \"x\"\nrequires-python = \">=3.10\"\n";
        assert_eq!(version_from_pyproject(content).as_deref(), Some("3.10"));
    }
}
