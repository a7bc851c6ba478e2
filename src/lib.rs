//! stackplan - language stack detection and container execution plans
//!
//! This library inspects a source tree, runs a set of per-language providers
//! against its file inventory, and reduces their answers to a ranked,
//! deduplicated list of detections. The strongest detection is then turned
//! into an execution plan describing how to build and run the project in a
//! container.
//!
//! # Core Concepts
//!
//! - **Providers**: stateless detectors, one per language runtime, that also
//!   know how to generate commands and environment for what they detect
//! - **Detection Engine**: runs providers with per-provider fault isolation,
//!   discards invalid results, then filters and merges the rest
//! - **Execution Plan**: base image, system packages, commands and environment
//!   derived from the primary detection
//!
//! # Example Usage
//!
//! ```no_run
//! use stackplan::{DetectOptions, DetectionEngine, LocalProject, ProjectScanner};
//!
//! # fn main() -> anyhow::Result<()> {
//! let scanner = ProjectScanner::new("/path/to/project")?;
//! let files = scanner.scan()?;
//! let ctx = LocalProject::new(scanner.root());
//!
//! let engine = DetectionEngine::with_defaults();
//! let results = engine.detect_project(scanner.root(), &files, &ctx, &DetectOptions::default())?;
//! for result in &results {
//!     println!("{} ({:.2})", result.language, result.confidence);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`providers`]: provider contract, built-in providers and registry
//! - [`detection`]: detection engine and result list operations
//! - [`bootstrap`]: file inventory scanning
//! - [`fs`]: filesystem abstraction and project context
//! - [`plan`]: execution plan generation

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod detection;
pub mod fs;
pub mod plan;
pub mod providers;
pub mod util;

pub use bootstrap::{FileInfo, ProjectScanner, ScanOptions};
pub use config::{ConfigError, StackplanConfig};
pub use detection::{
    best_result, detection_stats, filter_results, is_valid_detect_result, merge_results,
    DetectOptions, DetectionEngine, DetectionError, DetectionReport, DetectionStats,
};
pub use fs::{FileSystem, LocalProject, MockFileSystem, ProjectContext, RealFileSystem};
pub use plan::{ExecutionPlan, PlanGenerator, PlanOptions};
pub use providers::{
    CommandOptions, Commands, DetectResult, Evidence, Provider, ProviderRegistry,
};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
