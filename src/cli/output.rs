//! Output formatting for multiple formats
//!
//! Every command result can be rendered as JSON, YAML, or human-readable
//! text.
//!
//! # Example
//!
//! ```ignore
//! use stackplan::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_plan(&plan)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::detection::DetectionReport;
use crate::plan::ExecutionPlan;
use crate::providers::ProviderRegistry;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Row of `stackplan providers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub language: String,
    pub priority: u32,
}

impl ProviderInfo {
    /// All providers in full-scan order
    pub fn from_registry(registry: &ProviderRegistry) -> Vec<Self> {
        registry
            .by_priority()
            .iter()
            .map(|p| Self {
                name: p.name().to_string(),
                language: p.language().to_string(),
                priority: p.priority(),
            })
            .collect()
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn serialize<T: Serialize>(&self, value: &T, what: &str) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .map(Some)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            OutputFormat::Human => Ok(None),
        }
    }

    pub fn format_report(&self, report: &DetectionReport) -> Result<String> {
        match self.serialize(report, "detection report")? {
            Some(output) => Ok(output),
            None => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_plan(&self, plan: &ExecutionPlan) -> Result<String> {
        match self.serialize(plan, "execution plan")? {
            Some(output) => Ok(output),
            None => Ok(plan.to_string()),
        }
    }

    pub fn format_providers(&self, providers: &[ProviderInfo]) -> Result<String> {
        match self.serialize(&providers, "provider list")? {
            Some(output) => Ok(output),
            None => Ok(self.format_providers_human(providers)),
        }
    }

    fn format_report_human(&self, report: &DetectionReport) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Detection Result\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Project: {}\n\n", report.path.display()));

        for (i, result) in report.results.iter().enumerate() {
            let confidence_pct = (result.confidence * 100.0).round() as u32;
            let filled_blocks = ((result.confidence * 10.0) as usize).min(10);
            let confidence_bar =
                "\u{2588}".repeat(filled_blocks) + &"\u{2591}".repeat(10 - filled_blocks);

            output.push_str(&format!(
                "{}. {} ({})\n",
                i + 1,
                result.language,
                result.provider.as_deref().unwrap_or("-")
            ));
            if !result.framework.is_empty() {
                output.push_str(&format!("\u{251C}\u{2500} Framework:  {}\n", result.framework));
            }
            if !result.version.is_empty() {
                output.push_str(&format!("\u{251C}\u{2500} Version:    {}\n", result.version));
            }
            if let Some(ref pm) = result.package_manager {
                output.push_str(&format!("\u{251C}\u{2500} Packages:   {}\n", pm));
            }
            if !result.evidence.files.is_empty() {
                output.push_str(&format!(
                    "\u{251C}\u{2500} Files:      {}\n",
                    result.evidence.files.join(", ")
                ));
            }
            output.push_str(&format!(
                "\u{2514}\u{2500} Confidence: {} {}%\n\n",
                confidence_bar, confidence_pct
            ));
        }

        let stats = &report.stats;
        output.push_str("Summary:\n");
        output.push_str(&format!("  Matched:    {}/{}\n", stats.matched, stats.total));
        output.push_str(&format!("  Languages:  {}\n", stats.languages.join(", ")));
        if !stats.frameworks.is_empty() {
            output.push_str(&format!("  Frameworks: {}\n", stats.frameworks.join(", ")));
        }
        output.push_str(&format!(
            "  Average confidence: {:.1}%\n",
            stats.average_confidence * 100.0
        ));

        output
    }

    fn format_providers_human(&self, providers: &[ProviderInfo]) -> String {
        let mut output = String::new();

        output.push_str("Registered Providers\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("{:<12} {:<12} {:>8}\n", "NAME", "LANGUAGE", "PRIORITY"));
        for p in providers {
            output.push_str(&format!("{:<12} {:<12} {:>8}\n", p.name, p.language, p.priority));
        }

        output
    }
}
