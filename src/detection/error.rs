use std::path::PathBuf;
use thiserror::Error;

/// Hard failures surfaced by detection and registry construction
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Caller named a provider that is not registered
    #[error("Unknown provider '{name}'. Available providers: {}", .available.join(", "))]
    UnknownProvider { name: String, available: Vec<String> },

    /// Provider failed to inspect evidence (explicit-provider mode only)
    #[error("Provider '{provider}' failed: {source}")]
    ProviderFailed {
        provider: String,
        #[source]
        source: anyhow::Error,
    },

    /// Nothing matched after filtering
    #[error("No supported language or framework detected in {}", .path.display())]
    NoDetection { path: PathBuf },

    #[error("Duplicate provider name: {0}")]
    DuplicateProvider(String),

    #[error("Provider '{provider}' has invalid priority {priority} (must be positive)")]
    InvalidPriority { provider: String, priority: u32 },
}

impl DetectionError {
    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            DetectionError::UnknownProvider { name, available } => format!(
                "Error: Unknown provider '{}'\n\n\
                Help: Choose one of the registered providers:\n  {}\n\n\
                Or omit --provider to scan with all of them.",
                name,
                available.join(", ")
            ),
            DetectionError::ProviderFailed { provider, source } => format!(
                "Error: Provider '{}' could not inspect the project\n\n\
                Help: Check that the project files are readable, or omit\n\
                --provider so other providers can still run.\n\n\
                Details: {:#}",
                provider, source
            ),
            DetectionError::NoDetection { path } => format!(
                "Error: No supported language or framework detected\nPath: {}\n\n\
                Help: Please check:\n\
                - Is this the project root (where the manifest lives)?\n\
                - Is the manifest excluded by .gitignore or scan limits?\n\
                - Try lowering --min-confidence or raising --max-depth\n\
                - List supported providers: stackplan providers",
                path.display()
            ),
            DetectionError::DuplicateProvider(_) | DetectionError::InvalidPriority { .. } => {
                format!("Error: Invalid provider registry\n\nDetails: {}", self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_lists_names() {
        let err = DetectionError::UnknownProvider {
            name: "cobol".to_string(),
            available: vec!["go".to_string(), "node".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown provider 'cobol'. Available providers: go, node"
        );
        assert!(err.help_message().contains("go, node"));
    }

    #[test]
    fn test_provider_failed_keeps_source() {
        let err = DetectionError::ProviderFailed {
            provider: "java".to_string(),
            source: anyhow::anyhow!("pom.xml unreadable"),
        };
        assert!(err.to_string().contains("java"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.help_message().contains("pom.xml unreadable"));
    }

    #[test]
    fn test_no_detection_names_path() {
        let err = DetectionError::NoDetection {
            path: PathBuf::from("/tmp/empty"),
        };
        assert!(err.to_string().contains("/tmp/empty"));
        assert!(err.help_message().contains("Path: /tmp/empty"));
    }
}
