use super::schema::{Alternative, ExecutionPlan};
use crate::detection::{best_result, DetectionError};
use crate::providers::{CommandOptions, DetectResult, ProviderRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_BASE_IMAGE: &str = "debian:bookworm-slim";

/// Toolchain added when the primary provider needs native compilation
pub const NATIVE_BUILD_PACKAGES: &[&str] = &["build-essential", "pkg-config"];

/// Knobs for plan generation that do not affect detection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Use offline install variants where the tool supports them
    pub offline: bool,
    /// Target platform recorded in the plan (e.g., "linux/arm64")
    pub platform: Option<String>,
    /// Base image override
    pub base: Option<String>,
}

/// Builds an [`ExecutionPlan`] from detection output
#[derive(Debug, Clone)]
pub struct PlanGenerator {
    registry: Arc<ProviderRegistry>,
    options: PlanOptions,
}

impl PlanGenerator {
    pub fn new(registry: Arc<ProviderRegistry>, options: PlanOptions) -> Self {
        Self { registry, options }
    }

    /// Plan for the strongest result; the others become alternatives
    pub fn generate(
        &self,
        project_path: &Path,
        results: &[DetectResult],
    ) -> Result<ExecutionPlan, DetectionError> {
        let primary = best_result(results).ok_or_else(|| DetectionError::NoDetection {
            path: project_path.to_path_buf(),
        })?;

        let provider_name = primary.provider.clone().unwrap_or_default();
        let provider =
            self.registry
                .get(&provider_name)
                .ok_or_else(|| DetectionError::UnknownProvider {
                    name: provider_name.clone(),
                    available: self.registry.names(),
                })?;

        debug!(provider = %provider_name, language = %primary.language, "Generating plan");

        let commands = provider.generate_commands(
            primary,
            &CommandOptions {
                offline: self.options.offline,
            },
        );
        let environment = provider.generate_environment(primary);

        let system_packages = if provider.needs_native_compilation(primary) {
            NATIVE_BUILD_PACKAGES.iter().map(|p| p.to_string()).collect()
        } else {
            Vec::new()
        };

        let alternatives = results
            .iter()
            .filter(|r| !std::ptr::eq(*r, primary))
            .map(|r| Alternative {
                provider: r.provider.clone().unwrap_or_default(),
                language: r.language.clone(),
                confidence: r.confidence,
            })
            .collect();

        let plan = ExecutionPlan {
            provider: provider_name,
            language: primary.language.clone(),
            framework: primary.framework.clone(),
            version: primary.version.clone(),
            confidence: primary.confidence,
            base_image: self
                .options
                .base
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_IMAGE.to_string()),
            platform: self.options.platform.clone(),
            system_packages,
            commands,
            environment,
            evidence: primary.evidence.clone(),
            alternatives,
        };

        info!(
            provider = %plan.provider,
            language = %plan.language,
            base_image = %plan.base_image,
            native = !plan.system_packages.is_empty(),
            "Execution plan generated"
        );

        Ok(plan)
    }
}
