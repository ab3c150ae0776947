//! Provider contract — what a generative backend must implement.
//!
//! A provider is [`Pluggable`] (named, configured from its property slice)
//! and reports its capabilities through the `supports_*` predicates. The
//! actual operations live in the [`ChatProvider`] and [`EmbeddingProvider`]
//! traits, reached through `as_chat` / `as_embedding`.

use async_trait::async_trait;

use omnigate_core::types::{ChatRequest, ModelParameters, ProviderInfo};
use omnigate_core::{CapabilitySet, Pluggable, ProviderError, ServiceLevel};

use crate::sink::TokenSink;

/// Chat completion, synchronous and streamed.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Produce the full completion text.
    async fn generate_chat_response(&self, request: &ChatRequest) -> Result<String, ProviderError>;

    /// Push tokens into `sink` in generation order.
    ///
    /// Implementations may call `sink.complete()` / `sink.fail()` themselves;
    /// if they return without doing so, the caller closes the stream.
    async fn stream_chat_response(
        &self,
        request: &ChatRequest,
        sink: &TokenSink,
    ) -> Result<(), ProviderError>;
}

/// Text embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn generate_embedding(
        &self,
        text: &str,
        parameters: &ModelParameters,
    ) -> Result<Vec<f32>, ProviderError>;
}

/// A generative AI backend.
pub trait GenerativeProvider: Pluggable {
    fn service_level(&self) -> ServiceLevel {
        ServiceLevel::Level1
    }

    fn supports_chat(&self) -> bool {
        false
    }

    fn supports_embeddings(&self) -> bool {
        false
    }

    fn supports_rag(&self) -> bool {
        false
    }

    fn supports_agents(&self) -> bool {
        false
    }

    /// Chat operations, if implemented.
    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        None
    }

    /// Embedding operations, if implemented.
    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        None
    }

    /// Capability flags derived from the `supports_*` predicates.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            chat: self.supports_chat(),
            embedding: self.supports_embeddings(),
            rag: self.supports_rag(),
            agents: self.supports_agents(),
        }
    }

    /// Listing entry for this provider.
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider_name: self.name().to_lowercase(),
            service_level: self.service_level(),
            capabilities: self.capabilities().to_map(),
        }
    }
}
