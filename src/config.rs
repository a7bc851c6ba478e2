//! Configuration management for stackplan
//!
//! Settings are loaded from environment variables with fallback defaults.
//! Command-line flags override whatever is loaded here.
//!
//! # Environment Variables
//!
//! - `STACKPLAN_LOG_LEVEL`: Logging level - default: "info"
//! - `STACKPLAN_MIN_CONFIDENCE`: Minimum confidence kept after detection - default: "0.5"
//!   (0 selects the default)
//! - `STACKPLAN_MAX_DEPTH`: Maximum scan depth - default: "10"
//! - `STACKPLAN_MAX_FILES`: Maximum files scanned - default: "1000"
//! - `STACKPLAN_PARALLEL`: Run providers in parallel (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use stackplan::StackplanConfig;
//!
//! let config = StackplanConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::bootstrap::ScanOptions;
use crate::detection::{DetectOptions, DEFAULT_MIN_CONFIDENCE};
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_DEPTH: usize = 10;
const DEFAULT_MAX_FILES: usize = 1000;
const DEFAULT_PARALLEL: bool = false;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

impl ConfigError {
    pub fn help_message(&self) -> String {
        format!(
            "Error: Configuration error\n\n\
            Help: Check the STACKPLAN_* environment variables:\n\
            - STACKPLAN_LOG_LEVEL (trace, debug, info, warn, error)\n\
            - STACKPLAN_MIN_CONFIDENCE (0.0 to 1.0)\n\
            - STACKPLAN_MAX_DEPTH, STACKPLAN_MAX_FILES (positive integers)\n\n\
            Details: {}",
            self
        )
    }
}

/// Runtime settings shared by the CLI commands
#[derive(Debug, Clone, PartialEq)]
pub struct StackplanConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Minimum confidence for a detection to be kept
    pub min_confidence: f64,

    /// Maximum directory depth scanned
    pub max_depth: usize,

    /// Maximum number of files scanned
    pub max_files: usize,

    /// Run providers on the rayon pool
    pub parallel: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Default for StackplanConfig {
    /// Loads STACKPLAN_* environment variables, falling back to defaults for
    /// anything missing or unparseable
    fn default() -> Self {
        let log_level = env::var("STACKPLAN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            log_level,
            min_confidence: env_parse("STACKPLAN_MIN_CONFIDENCE").unwrap_or(DEFAULT_MIN_CONFIDENCE),
            max_depth: env_parse("STACKPLAN_MAX_DEPTH").unwrap_or(DEFAULT_MAX_DEPTH),
            max_files: env_parse("STACKPLAN_MAX_FILES").unwrap_or(DEFAULT_MAX_FILES),
            parallel: env_parse("STACKPLAN_PARALLEL").unwrap_or(DEFAULT_PARALLEL),
        }
    }
}

impl StackplanConfig {
    /// Loads from the environment and validates
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_confidence.is_nan() || !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ValidationFailed(format!(
                "Minimum confidence must be between 0.0 and 1.0, got {}",
                self.min_confidence
            )));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max depth must be at least 1".to_string(),
            ));
        }

        if self.max_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max files must be at least 1".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_depth: self.max_depth,
            max_files: self.max_files,
        }
    }

    pub fn detect_options(&self) -> DetectOptions {
        DetectOptions::default().with_min_confidence(self.min_confidence)
    }
}

impl fmt::Display for StackplanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stackplan Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Min Confidence: {}", self.min_confidence)?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Max Files: {}", self.max_files)?;
        writeln!(f, "  Parallel: {}", self.parallel)?;
        Ok(())
    }
}
