//! ExecutionPlan data structures

use crate::providers::{Commands, Evidence};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Another language found in the project but not chosen as primary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub provider: String,
    pub language: String,
    pub confidence: f64,
}

/// Declarative description of how to build and run a project in a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Provider that produced the primary detection
    pub provider: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub framework: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub confidence: f64,
    /// Base container image (e.g., "debian:bookworm-slim")
    pub base_image: String,
    /// Target platform (e.g., "linux/amd64")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// System packages to install before building
    #[serde(default)]
    pub system_packages: Vec<String>,
    pub commands: Commands,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    pub evidence: Evidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
}

fn confidence_level(confidence: f64) -> &'static str {
    match confidence {
        c if c >= 0.9 => "Very High",
        c if c >= 0.8 => "High",
        c if c >= 0.7 => "Moderate",
        c if c >= 0.6 => "Low",
        _ => "Very Low",
    }
}

fn write_commands(f: &mut fmt::Formatter<'_>, stage: &str, commands: &[String]) -> fmt::Result {
    if commands.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {}:", stage)?;
    for cmd in commands {
        writeln!(f, "    - {}", cmd)?;
    }
    Ok(())
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution Plan")?;
        writeln!(f, "==============")?;
        writeln!(f, "Provider:   {}", self.provider)?;
        writeln!(f, "Language:   {}", self.language)?;
        if !self.framework.is_empty() {
            writeln!(f, "Framework:  {}", self.framework)?;
        }
        if !self.version.is_empty() {
            writeln!(f, "Version:    {}", self.version)?;
        }
        writeln!(
            f,
            "Confidence: {:.1}% ({})",
            self.confidence * 100.0,
            confidence_level(self.confidence)
        )?;
        writeln!(f)?;

        writeln!(f, "Base Image: {}", self.base_image)?;
        if let Some(ref platform) = self.platform {
            writeln!(f, "Platform:   {}", platform)?;
        }
        if !self.system_packages.is_empty() {
            writeln!(f, "Packages:   {}", self.system_packages.join(", "))?;
        }
        writeln!(f)?;

        writeln!(f, "Commands:")?;
        write_commands(f, "Dev", &self.commands.dev)?;
        write_commands(f, "Build", &self.commands.build)?;
        write_commands(f, "Start", &self.commands.start)?;

        if !self.environment.is_empty() {
            writeln!(f)?;
            writeln!(f, "Environment:")?;
            for (key, value) in &self.environment {
                writeln!(f, "  {}={}", key, value)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Evidence:")?;
        writeln!(f, "  {}", self.evidence.reason)?;
        for file in &self.evidence.files {
            writeln!(f, "  - {}", file)?;
        }

        if !self.alternatives.is_empty() {
            writeln!(f)?;
            writeln!(f, "Also detected:")?;
            for alt in &self.alternatives {
                writeln!(
                    f,
                    "  - {} ({}, {:.1}%)",
                    alt.language,
                    alt.provider,
                    alt.confidence * 100.0
                )?;
            }
        }

        Ok(())
    }
}

impl ExecutionPlan {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize ExecutionPlan to YAML")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize ExecutionPlan to JSON")
    }

    /// Structural checks on a generated plan
    ///
    /// A plan needs a provider, language and base image, confidence in range,
    /// and at least one start command.
    pub fn validate(&self) -> Result<()> {
        if self.provider.is_empty() {
            anyhow::bail!("Provider cannot be empty");
        }
        if self.language.is_empty() {
            anyhow::bail!("Language cannot be empty");
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            anyhow::bail!(
                "Confidence score must be between 0.0 and 1.0, got {}",
                self.confidence
            );
        }
        if self.base_image.is_empty() {
            anyhow::bail!("Base image cannot be empty");
        }
        if self.commands.start.is_empty() {
            anyhow::bail!("Plan has no start command");
        }
        Ok(())
    }
}
