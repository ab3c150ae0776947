//! Plugin registry — indexes initialized plugins by lowercase name.
//!
//! Every plugin family (generative providers, vector stores) is loaded the
//! same way: for each candidate, take the slice of the flat configuration
//! whose keys start with `"<name>."`, strip the prefix, and initialize the
//! candidate with it. A candidate whose slice is empty is considered absent.
//! An initialization failure aborts the whole load.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Properties;
use crate::error::{GatewayError, GatewayResult, ProviderError};

// ─────────────────────────────────────────────
// Pluggable
// ─────────────────────────────────────────────

/// The part of the provider contract the registry needs.
pub trait Pluggable: Send + Sync {
    /// Provider name (e.g. `"openai"`). Matched case-insensitively.
    fn name(&self) -> &str;

    /// Configure the provider from its prefix-stripped configuration slice.
    fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError>;
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Read-only map of provider name → initialized provider.
///
/// Built once at startup, then shared behind an `Arc`; lookups take no lock.
pub struct Registry<P: ?Sized> {
    entries: HashMap<String, Arc<P>>,
}

impl<P: ?Sized + Pluggable> Registry<P> {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Initialize every candidate that has configuration and index it.
    ///
    /// Initialization errors are not caught: a misconfigured provider must
    /// abort startup rather than silently disappear.
    pub fn load<I>(candidates: I, properties: &Properties) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = Box<P>>,
    {
        let mut entries: HashMap<String, Arc<P>> = HashMap::new();

        for mut candidate in candidates {
            let name = candidate.name().to_lowercase();
            let slice = properties.filter_prefix(&format!("{name}."));

            if slice.is_empty() {
                debug!(provider = %name, "no configuration, skipping");
                continue;
            }
            if entries.contains_key(&name) {
                warn!(provider = %name, "duplicate provider name, keeping the first");
                continue;
            }

            candidate.initialize(&slice)?;
            info!(provider = %name, keys = slice.len(), "initialized provider");
            entries.insert(name, Arc::from(candidate));
        }

        Ok(Self { entries })
    }

    /// Look up a provider by name (case-insensitive, exact).
    pub fn get(&self, name: &str) -> GatewayResult<Arc<P>> {
        self.entries
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| GatewayError::ProviderNotFound(name.to_string()))
    }

    /// Whether a provider with this name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Loaded provider names, sorted for determinism.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Loaded providers, sorted by name.
    pub fn providers(&self) -> Vec<Arc<P>> {
        self.names()
            .iter()
            .filter_map(|n| self.entries.get(n).cloned())
            .collect()
    }

    /// Number of loaded providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no provider was loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized + Pluggable> Default for Registry<P> {
    fn default() -> Self {
        Self::empty()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    trait Widget: Pluggable {
        fn seen(&self) -> Properties;
    }

    struct Dummy {
        name: &'static str,
        seen: Properties,
        fail: bool,
    }

    impl Dummy {
        fn boxed(name: &'static str) -> Box<dyn Widget> {
            Box::new(Dummy {
                name,
                seen: Properties::new(),
                fail: false,
            })
        }
    }

    impl Pluggable for Dummy {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError> {
            if self.fail {
                return Err(ProviderError::config(self.name, "boom"));
            }
            self.seen = config.clone();
            Ok(())
        }
    }

    impl Widget for Dummy {
        fn seen(&self) -> Properties {
            self.seen.clone()
        }
    }

    fn props() -> Properties {
        [
            ("alpha.api_key", "a"),
            ("alpha.chat_url", "http://a"),
            ("beta.api_key", "b"),
            ("server.port", "1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_configured_providers_are_loaded() {
        let reg: Registry<dyn Widget> =
            Registry::load(vec![Dummy::boxed("Alpha"), Dummy::boxed("beta")], &props()).unwrap();

        assert_eq!(reg.names(), vec!["alpha", "beta"]);
        let alpha = reg.get("ALPHA").unwrap();
        assert_eq!(alpha.seen().get("api_key"), Some("a"));
        assert_eq!(alpha.seen().get("chat_url"), Some("http://a"));
        assert!(alpha.seen().get("server.port").is_none());
    }

    #[test]
    fn test_unconfigured_provider_is_indistinguishable_from_missing() {
        let reg: Registry<dyn Widget> =
            Registry::load(vec![Dummy::boxed("alpha"), Dummy::boxed("gamma")], &props()).unwrap();

        assert!(!reg.contains("gamma"));
        assert!(matches!(
            reg.get("gamma"),
            Err(GatewayError::ProviderNotFound(ref n)) if n == "gamma"
        ));
        assert!(matches!(
            reg.get("nonexistent"),
            Err(GatewayError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_initialize_failure_aborts_load() {
        let failing: Box<dyn Widget> = Box::new(Dummy {
            name: "beta",
            seen: Properties::new(),
            fail: true,
        });
        let result: Result<Registry<dyn Widget>, _> =
            Registry::load(vec![Dummy::boxed("alpha"), failing], &props());
        assert!(matches!(result, Err(ProviderError::Config { .. })));
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let reg: Registry<dyn Widget> =
            Registry::load(vec![Dummy::boxed("alpha"), Dummy::boxed("ALPHA")], &props()).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let reg: Registry<dyn Widget> = Registry::empty();
        assert!(reg.is_empty());
        assert!(reg.providers().is_empty());
    }
}
