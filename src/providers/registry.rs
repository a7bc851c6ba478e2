use super::{
    DenoProvider, GoProvider, JavaProvider, NodeProvider, PhpProvider, Provider, PythonProvider,
    RubyProvider, RustProvider, ShellProvider, StaticfileProvider,
};
use crate::detection::DetectionError;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable name -> provider map, built once and shared read-only
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Registry with every built-in provider
    pub fn with_defaults() -> Self {
        let providers: Vec<Arc<dyn Provider>> = vec![
            Arc::new(PhpProvider),
            Arc::new(GoProvider),
            Arc::new(JavaProvider),
            Arc::new(RustProvider),
            Arc::new(RubyProvider),
            Arc::new(PythonProvider),
            Arc::new(DenoProvider),
            Arc::new(NodeProvider),
            Arc::new(StaticfileProvider),
            Arc::new(ShellProvider),
        ];

        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.name().to_string(), p))
                .collect(),
        }
    }

    /// Builds a registry from an arbitrary provider set
    ///
    /// Names must be unique and priorities positive.
    pub fn from_providers(providers: Vec<Arc<dyn Provider>>) -> Result<Self, DetectionError> {
        let mut map: HashMap<String, Arc<dyn Provider>> = HashMap::with_capacity(providers.len());
        for provider in providers {
            let name = provider.name().to_string();
            if provider.priority() == 0 {
                return Err(DetectionError::InvalidPriority {
                    provider: name,
                    priority: provider.priority(),
                });
            }
            if map.contains_key(&name) {
                return Err(DetectionError::DuplicateProvider(name));
            }
            map.insert(name, provider);
        }
        Ok(Self { providers: map })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Every provider keyed by name
    pub fn all(&self) -> &HashMap<String, Arc<dyn Provider>> {
        &self.providers
    }

    /// Registered names in lexical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers ordered by ascending priority, ties broken by name
    pub fn by_priority(&self) -> Vec<Arc<dyn Provider>> {
        let mut providers: Vec<Arc<dyn Provider>> = self.providers.values().cloned().collect();
        providers.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        providers
    }

    /// Union of every provider's excluded directories, sorted
    pub fn all_excluded_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = self
            .providers
            .values()
            .flat_map(|p| p.excluded_dirs().iter().map(|d| d.to_string()))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::FileInfo;
    use crate::fs::ProjectContext;
    use crate::providers::{CommandOptions, Commands, DetectResult};
    use std::collections::BTreeMap;
    use std::path::Path;

    struct Named(&'static str, u32);

    impl Provider for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn language(&self) -> &str {
            self.0
        }
        fn priority(&self) -> u32 {
            self.1
        }
        fn detect(
            &self,
            _: &Path,
            _: &[FileInfo],
            _: &dyn ProjectContext,
        ) -> anyhow::Result<DetectResult> {
            Ok(DetectResult::no_match())
        }
        fn generate_commands(&self, _: &DetectResult, _: &CommandOptions) -> Commands {
            Commands::default()
        }
        fn generate_environment(&self, _: &DetectResult) -> BTreeMap<String, String> {
            BTreeMap::new()
        }
        fn needs_native_compilation(&self, _: &DetectResult) -> bool {
            false
        }
    }

    #[test]
    fn test_defaults_contain_all_builtin_providers() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.names(),
            vec![
                "deno", "go", "java", "node", "php", "python", "ruby", "rust", "shell",
                "staticfile"
            ]
        );
        assert!(registry.get("go").is_some());
        assert!(registry.get("cobol").is_none());
    }

    #[test]
    fn test_all_maps_names_to_providers() {
        let registry = ProviderRegistry::with_defaults();
        let all = registry.all();
        assert_eq!(all.len(), 10);
        for (name, provider) in all {
            assert_eq!(provider.name(), name);
        }
        assert_eq!(all["node"].language(), "javascript");
    }

    #[test]
    fn test_priority_order_is_stable() {
        let order: Vec<String> = ProviderRegistry::with_defaults()
            .by_priority()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(
            order,
            vec![
                "php", "go", "java", "rust", "ruby", "python", "deno", "node", "staticfile",
                "shell"
            ]
        );
    }

    #[test]
    fn test_equal_priority_breaks_ties_by_name() {
        let registry = ProviderRegistry::from_providers(vec![
            Arc::new(Named("zeta", 5)),
            Arc::new(Named("alpha", 5)),
            Arc::new(Named("first", 1)),
        ])
        .unwrap();
        let order: Vec<String> = registry
            .by_priority()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(order, vec!["first", "alpha", "zeta"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ProviderRegistry::from_providers(vec![
            Arc::new(Named("go", 1)),
            Arc::new(Named("go", 2)),
        ])
        .unwrap_err();
        assert!(matches!(err, DetectionError::DuplicateProvider(name) if name == "go"));
    }

    #[test]
    fn test_zero_priority_rejected() {
        let err = ProviderRegistry::from_providers(vec![Arc::new(Named("x", 0))]).unwrap_err();
        assert!(matches!(err, DetectionError::InvalidPriority { priority: 0, .. }));
    }

    #[test]
    fn test_excluded_dirs_union() {
        let dirs = ProviderRegistry::with_defaults().all_excluded_dirs();
        assert!(dirs.contains(&"node_modules".to_string()));
        assert!(dirs.contains(&"target".to_string()));
        assert!(dirs.contains(&"vendor".to_string()));
        assert!(dirs.windows(2).all(|w| w[0] < w[1]));
    }
}
