//! In-process provider for unit tests.

use async_trait::async_trait;

use omnigate_core::types::{ChatRequest, ModelParameters};
use omnigate_core::{Pluggable, Properties, ProviderError, Registry};
use omnigate_providers::{
    ChatProvider, EmbeddingProvider, GenerativeProvider, ProviderRegistry, TokenSink,
};

/// Echoes the prompt back, word by word when streaming. Fails when the
/// prompt is "boom". Implements embeddings but does not claim the
/// capability.
pub struct Echo;

impl Pluggable for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn initialize(&mut self, _config: &Properties) -> Result<(), ProviderError> {
        Ok(())
    }
}

impl GenerativeProvider for Echo {
    fn supports_chat(&self) -> bool {
        true
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        Some(self)
    }

    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        Some(self)
    }
}

#[async_trait]
impl ChatProvider for Echo {
    async fn generate_chat_response(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        if request.prompt == "boom" {
            return Err(ProviderError::Backend("exploded".into()));
        }
        Ok(request.prompt.clone())
    }

    async fn stream_chat_response(
        &self,
        request: &ChatRequest,
        sink: &TokenSink,
    ) -> Result<(), ProviderError> {
        for word in request.prompt.split_inclusive(' ') {
            sink.send_token(word).await?;
        }
        if request.prompt == "boom" {
            return Err(ProviderError::Backend("exploded".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for Echo {
    async fn generate_embedding(
        &self,
        _text: &str,
        _parameters: &ModelParameters,
    ) -> Result<Vec<f32>, ProviderError> {
        Ok(vec![1.0])
    }
}

/// A registry holding only [`Echo`].
pub fn echo_registry() -> ProviderRegistry {
    let props: Properties = [("echo.enabled", "true")].into_iter().collect();
    let candidates: Vec<Box<dyn GenerativeProvider>> = vec![Box::new(Echo)];
    Registry::load(candidates, &props).unwrap()
}
