//! Generative provider layer for Omnigate.
//!
//! # Architecture
//!
//! - [`traits::GenerativeProvider`] — capability surface every provider implements
//! - [`traits::ChatProvider`] / [`traits::EmbeddingProvider`] — the operations
//! - [`sink::TokenSink`] — where a streaming provider pushes its tokens
//! - [`registry`] — static catalog of built-in providers, discovery and loading
//! - [`http_provider::HttpProvider`] — generic OpenAI-compatible HTTP client

pub mod http_provider;
pub mod registry;
pub mod sink;
pub mod traits;

// Re-export main types for convenience
pub use http_provider::HttpProvider;
pub use registry::{discover_all, load_providers, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use sink::TokenSink;
pub use traits::{ChatProvider, EmbeddingProvider, GenerativeProvider};
