use super::error::DetectionError;
use super::results::{filter_results, is_valid_detect_result, merge_results};
use super::stats::{detection_stats, DetectionStats};
use crate::bootstrap::FileInfo;
use crate::fs::ProjectContext;
use crate::providers::{DetectResult, Provider, ProviderRegistry};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Caller knobs that affect detection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectOptions {
    /// Run only this provider instead of scanning with all of them
    pub provider: Option<String>,
    /// Minimum confidence kept after detection; zero selects the default
    pub min_confidence: f64,
}

impl DetectOptions {
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

/// Final result list plus its aggregate, as printed by `stackplan detect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub path: PathBuf,
    pub results: Vec<DetectResult>,
    pub stats: DetectionStats,
}

/// Runs providers against a file inventory and reduces their results
///
/// The engine holds no per-call state. The registry is shared read-only, so
/// one engine can serve any number of detections, concurrently or not.
#[derive(Debug, Clone)]
pub struct DetectionEngine {
    registry: Arc<ProviderRegistry>,
    parallel: bool,
}

impl DetectionEngine {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ProviderRegistry::with_defaults()))
    }

    /// Fan provider execution out over the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Registered provider names, sorted
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn select_providers(&self, explicit: Option<&str>) -> Result<Vec<Arc<dyn Provider>>, DetectionError> {
        match explicit {
            Some(name) => self
                .registry
                .get(name)
                .map(|p| vec![p])
                .ok_or_else(|| DetectionError::UnknownProvider {
                    name: name.to_string(),
                    available: self.provider_names(),
                }),
            None => Ok(self.registry.by_priority()),
        }
    }

    /// Invokes one provider and keeps its result only if valid and matched
    ///
    /// Infrastructure errors come back as `ProviderFailed`; the caller decides
    /// whether that is fatal.
    pub fn run_provider(
        &self,
        provider: &dyn Provider,
        project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
    ) -> Result<Option<DetectResult>, DetectionError> {
        let name = provider.name();
        debug!(provider = %name, "Running provider");

        let mut result = provider
            .detect(project_path, files, ctx)
            .map_err(|source| DetectionError::ProviderFailed {
                provider: name.to_string(),
                source,
            })?;

        if !is_valid_detect_result(Some(&result)) {
            warn!(
                provider = %name,
                matched = result.matched,
                confidence = result.confidence,
                language = %result.language,
                "Discarding invalid detection result"
            );
            return Ok(None);
        }

        if !result.matched {
            debug!(provider = %name, "Provider did not match");
            return Ok(None);
        }

        if result.provider.is_none() {
            result.provider = Some(name.to_string());
        }

        debug!(
            provider = %name,
            language = %result.language,
            framework = %result.framework,
            confidence = result.confidence,
            "Provider matched"
        );
        Ok(Some(result))
    }

    /// Valid matched results in provider priority order, before filtering
    ///
    /// With an explicit provider its failure is returned; in a full scan a
    /// failing provider is logged and skipped.
    pub fn collect_results(
        &self,
        project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
        provider: Option<&str>,
    ) -> Result<Vec<DetectResult>, DetectionError> {
        let providers = self.select_providers(provider)?;

        if provider.is_some() {
            let mut results = Vec::new();
            for p in &providers {
                results.extend(self.run_provider(p.as_ref(), project_path, files, ctx)?);
            }
            return Ok(results);
        }

        let run = |p: &Arc<dyn Provider>| {
            self.run_provider(p.as_ref(), project_path, files, ctx)
        };

        // One slot per provider, in priority order, whatever the execution order
        let slots: Vec<Result<Option<DetectResult>, DetectionError>> = if self.parallel {
            providers.par_iter().map(run).collect()
        } else {
            providers.iter().map(run).collect()
        };

        let mut results = Vec::new();
        for slot in slots {
            match slot {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Provider failed, skipping"),
            }
        }
        Ok(results)
    }

    /// Collect, filter by confidence, then merge per language
    pub fn detect_project(
        &self,
        project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
        options: &DetectOptions,
    ) -> Result<Vec<DetectResult>, DetectionError> {
        let start = Instant::now();

        let collected = self.collect_results(project_path, files, ctx, options.provider.as_deref())?;
        let filtered = filter_results(&collected, options.min_confidence);
        let merged = merge_results(&filtered);

        info!(
            path = %project_path.display(),
            files = files.len(),
            collected = collected.len(),
            kept = merged.len(),
            parallel = self.parallel,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Detection completed"
        );

        if merged.is_empty() {
            return Err(DetectionError::NoDetection {
                path: project_path.to_path_buf(),
            });
        }
        Ok(merged)
    }

    /// `detect_project` plus statistics over the kept results
    pub fn analyze(
        &self,
        project_path: &Path,
        files: &[FileInfo],
        ctx: &dyn ProjectContext,
        options: &DetectOptions,
    ) -> Result<DetectionReport, DetectionError> {
        let results = self.detect_project(project_path, files, ctx, options)?;
        let stats = detection_stats(&results);
        Ok(DetectionReport {
            path: project_path.to_path_buf(),
            results,
            stats,
        })
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
