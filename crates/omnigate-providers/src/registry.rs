//! Provider catalog — static specs for every built-in generative provider,
//! and loading them into a [`Registry`].
//!
//! Each `ProviderSpec` describes one backend: its name (also its config
//! prefix), capability flags, service level and endpoint defaults. All of
//! them speak the OpenAI-compatible chat completions API, so one
//! [`HttpProvider`] implementation serves the whole catalog.

use omnigate_core::{Properties, ProviderError, Registry, ServiceLevel};

use crate::http_provider::HttpProvider;
use crate::traits::GenerativeProvider;

/// Registry of initialized generative providers.
pub type ProviderRegistry = Registry<dyn GenerativeProvider>;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one generative provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name and config prefix (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    pub service_level: ServiceLevel,
    pub supports_chat: bool,
    pub supports_embeddings: bool,
    /// Local/self-hosted: no API key required.
    pub is_local: bool,
    /// Base URL used when `api_base` is not configured.
    pub default_api_base: &'static str,
    /// Chat model used when neither the request nor `default_lm_model` names one.
    pub default_lm_model: &'static str,
    /// Embedding model used when neither the request nor
    /// `default_embedding_model` names one. Empty for chat-only providers.
    pub default_embedding_model: &'static str,
}

// ─────────────────────────────────────────────
// Built-in providers
// ─────────────────────────────────────────────

/// Every built-in provider specification.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        service_level: ServiceLevel::Level2,
        supports_chat: true,
        supports_embeddings: true,
        is_local: false,
        default_api_base: "https://api.openai.com/v1",
        default_lm_model: "gpt-4o-mini",
        default_embedding_model: "text-embedding-3-small",
    },
    ProviderSpec {
        name: "grok",
        display_name: "Grok",
        service_level: ServiceLevel::Level2,
        supports_chat: true,
        supports_embeddings: false,
        is_local: false,
        default_api_base: "https://api.x.ai/v1",
        default_lm_model: "grok-beta",
        default_embedding_model: "",
    },
    ProviderSpec {
        name: "google",
        display_name: "Google Gemini",
        service_level: ServiceLevel::Level1,
        supports_chat: true,
        supports_embeddings: false,
        is_local: false,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
        default_lm_model: "gemini-1.5-flash-001",
        default_embedding_model: "",
    },
    ProviderSpec {
        name: "anthropic",
        display_name: "Anthropic",
        service_level: ServiceLevel::Level1,
        supports_chat: true,
        supports_embeddings: false,
        is_local: false,
        default_api_base: "https://api.anthropic.com/v1",
        default_lm_model: "claude-3-5-haiku-latest",
        default_embedding_model: "",
    },
    ProviderSpec {
        name: "ollama",
        display_name: "Ollama",
        service_level: ServiceLevel::Level1,
        supports_chat: true,
        supports_embeddings: true,
        is_local: true,
        default_api_base: "http://localhost:11434/v1",
        default_lm_model: "llama3",
        default_embedding_model: "nomic-embed-text",
    },
];

/// Find a provider spec by exact (case-insensitive) name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

// ─────────────────────────────────────────────
// Discovery and loading
// ─────────────────────────────────────────────

/// Every provider implementation compiled into this binary, uninitialized.
///
/// Re-enumerable: each call returns fresh instances.
pub fn discover_all() -> Vec<Box<dyn GenerativeProvider>> {
    PROVIDERS
        .iter()
        .map(|spec| Box::new(HttpProvider::from_spec(spec)) as Box<dyn GenerativeProvider>)
        .collect()
}

/// Initialize every configured provider from the flat property map.
///
/// Providers without any `<name>.*` key are skipped; an initialization
/// failure aborts the load.
pub fn load_providers(properties: &Properties) -> Result<ProviderRegistry, ProviderError> {
    Registry::load(discover_all(), properties)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use omnigate_core::GatewayError;

    #[test]
    fn test_find_by_name() {
        let spec = find_by_name("OpenAI").unwrap();
        assert_eq!(spec.display_name, "OpenAI");
        assert!(spec.supports_embeddings);
        assert!(find_by_name("milvus").is_none());
    }

    #[test]
    fn test_all_providers_have_unique_lowercase_names() {
        let names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "Duplicate provider names found");
        assert!(names.iter().all(|n| n.chars().all(|c| !c.is_uppercase())));
    }

    #[test]
    fn test_embedding_providers_have_default_model() {
        for spec in PROVIDERS.iter().filter(|s| s.supports_embeddings) {
            assert!(!spec.default_embedding_model.is_empty(), "{}", spec.name);
        }
    }

    #[test]
    fn test_discover_all_lists_catalog() {
        let names: Vec<String> = discover_all().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["openai", "grok", "google", "anthropic", "ollama"]);
    }

    #[test]
    fn test_load_only_configured_providers() {
        let props: Properties = [
            ("openai.api_key", "sk-test"),
            ("ollama.default_lm_model", "llama3.1"),
            ("server.port", "50051"),
        ]
        .into_iter()
        .collect();

        let registry = load_providers(&props).unwrap();
        assert_eq!(registry.names(), vec!["ollama", "openai"]);
        assert!(registry.get("OpenAI").is_ok());
        assert!(matches!(
            registry.get("grok"),
            Err(GatewayError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_load_fails_on_missing_api_key() {
        let props: Properties = [("grok.default_lm_model", "grok-2")].into_iter().collect();
        let err = load_providers(&props).err().unwrap();
        assert!(matches!(err, ProviderError::Config { ref provider, .. } if provider == "grok"));
    }

    #[test]
    fn test_empty_config_loads_nothing() {
        let registry = load_providers(&Properties::new()).unwrap();
        assert!(registry.is_empty());
    }
}
