use super::commands::{DetectArgs, PlanArgs, ProvidersArgs, ScanArgs};
use super::output::{OutputFormat, OutputFormatter, ProviderInfo};
use crate::bootstrap::ProjectScanner;
use crate::config::{ConfigError, StackplanConfig};
use crate::detection::{DetectionEngine, DetectionError, DetectionReport};
use crate::fs::LocalProject;
use crate::plan::{PlanGenerator, PlanOptions};
use crate::providers::ProviderRegistry;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Applies command-line overrides on top of the environment configuration
fn effective_config(scan: &ScanArgs) -> Result<StackplanConfig, ConfigError> {
    let mut config = StackplanConfig::default();
    if let Some(depth) = scan.max_depth {
        config.max_depth = depth;
    }
    if let Some(files) = scan.max_files {
        config.max_files = files;
    }
    if let Some(min_confidence) = scan.min_confidence {
        config.min_confidence = min_confidence;
    }
    if scan.parallel {
        config.parallel = true;
    }
    config.validate()?;
    Ok(config)
}

/// Scans the project and runs detection
fn run_detection(
    scan: &ScanArgs,
    registry: Arc<ProviderRegistry>,
) -> Result<DetectionReport> {
    let config = effective_config(scan)?;
    debug!(config = ?config, "Effective configuration");

    let path = scan
        .project_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let scanner = ProjectScanner::with_registry(&path, &registry)?
        .with_options(config.scan_options());
    let files = scanner.scan()?;
    let ctx = LocalProject::new(scanner.root());

    let mut options = config.detect_options();
    options.provider = scan.provider.clone();

    let engine = DetectionEngine::new(registry).with_parallel(config.parallel);
    let report = engine.analyze(scanner.root(), &files, &ctx, &options)?;
    Ok(report)
}

fn write_output(output: &str, file: Option<&Path>) -> Result<()> {
    match file {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            println!("{}", output.trim_end());
            Ok(())
        }
    }
}

/// Prints the most helpful message available for `err` and returns exit code 1
fn report_error(err: &anyhow::Error) -> i32 {
    error!(error = %err, "Command failed");
    if let Some(detection) = err.downcast_ref::<DetectionError>() {
        eprintln!("{}", detection.help_message());
    } else if let Some(config) = err.downcast_ref::<ConfigError>() {
        eprintln!("{}", config.help_message());
    } else {
        eprintln!("Error: {:#}", err);
    }
    1
}

pub fn handle_detect(args: &DetectArgs) -> i32 {
    let result = (|| -> Result<()> {
        let registry = Arc::new(ProviderRegistry::with_defaults());
        let report = run_detection(&args.scan, registry)?;
        let formatter = OutputFormatter::new(OutputFormat::from(args.format));
        write_output(&formatter.format_report(&report)?, args.output.as_deref())
    })();

    match result {
        Ok(()) => 0,
        Err(err) => report_error(&err),
    }
}

pub fn handle_plan(args: &PlanArgs) -> i32 {
    let result = (|| -> Result<()> {
        let registry = Arc::new(ProviderRegistry::with_defaults());
        let report = run_detection(&args.scan, Arc::clone(&registry))?;

        let generator = PlanGenerator::new(
            registry,
            PlanOptions {
                offline: args.offline,
                platform: args.platform.clone(),
                base: args.base.clone(),
            },
        );
        let plan = generator.generate(&report.path, &report.results)?;
        plan.validate().context("Generated plan is invalid")?;

        let formatter = OutputFormatter::new(OutputFormat::from(args.format));
        write_output(&formatter.format_plan(&plan)?, args.output.as_deref())
    })();

    match result {
        Ok(()) => 0,
        Err(err) => report_error(&err),
    }
}

pub fn handle_providers(args: &ProvidersArgs) -> i32 {
    let providers = ProviderInfo::from_registry(&ProviderRegistry::with_defaults());
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    match formatter
        .format_providers(&providers)
        .and_then(|output| write_output(&output, None))
    {
        Ok(()) => 0,
        Err(err) => report_error(&err),
    }
}
