//! Chat and embedding dispatch.
//!
//! Every call is validated the same way before a provider is touched:
//! the client must be registered, have a provider bound to the capability,
//! and that provider must be loaded and support the capability. These
//! failures are returned as errors.
//!
//! What happens to a failure inside the provider depends on the call:
//! - sync chat: downgraded into the response (`ChatResponse::failed`)
//! - streaming chat: delivered as the stream's `Failed` event
//! - embedding: returned as an error

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use omnigate_core::types::{
    ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, StreamEvent,
};
use omnigate_core::utils::truncate_string;
use omnigate_core::{Capability, GatewayError, GatewayResult, Pluggable, ProviderError};
use omnigate_providers::{GenerativeProvider, ProviderRegistry, TokenSink};

use crate::session::SessionTable;

// ─────────────────────────────────────────────
// ChatStream
// ─────────────────────────────────────────────

/// Events of one streaming chat: tokens in order, then exactly one
/// terminal event.
///
/// Dropping the stream aborts the provider task.
pub struct ChatStream {
    rx: mpsc::Receiver<StreamEvent>,
    task: JoinHandle<()>,
    finished: bool,
}

impl Stream for ChatStream {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    this.finished = true;
                }
                Poll::Ready(Some(event))
            }
            // The task ended without a terminal event (it panicked).
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(Some(StreamEvent::Failed(
                    "stream ended unexpectedly".to_string(),
                )))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("chat stream dropped, aborting provider task");
            self.task.abort();
        }
    }
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

/// Routes chat and embedding calls to the provider a client has bound.
pub struct Dispatcher {
    providers: Arc<ProviderRegistry>,
    sessions: Arc<SessionTable>,
    stream_buffer: usize,
}

impl Dispatcher {
    pub fn new(
        providers: Arc<ProviderRegistry>,
        sessions: Arc<SessionTable>,
        stream_buffer: usize,
    ) -> Self {
        Self {
            providers,
            sessions,
            stream_buffer,
        }
    }

    /// Bound, loaded provider for `capability`.
    fn resolve(
        &self,
        client_id: &str,
        capability: Capability,
    ) -> GatewayResult<Arc<dyn GenerativeProvider>> {
        let name = self
            .sessions
            .resolve_provider_for_capability(client_id, capability)?;
        self.providers.get(&name)
    }

    /// Bound provider for chat, checked for chat support.
    fn resolve_chat(&self, client_id: &str) -> GatewayResult<Arc<dyn GenerativeProvider>> {
        let provider = self.resolve(client_id, Capability::Chat)?;
        if !provider.supports_chat() || provider.as_chat().is_none() {
            return Err(unsupported(provider.as_ref(), Capability::Chat));
        }
        Ok(provider)
    }

    /// Synchronous chat.
    pub async fn chat(&self, request: &ChatRequest) -> GatewayResult<ChatResponse> {
        let provider = self.resolve_chat(&request.client_id)?;
        let Some(chat) = provider.as_chat() else {
            return Err(unsupported(provider.as_ref(), Capability::Chat));
        };

        debug!(
            client_id = %request.client_id,
            provider = provider.name(),
            prompt = %truncate_string(&request.prompt, 60),
            "dispatching chat"
        );
        match chat.generate_chat_response(request).await {
            Ok(completion) => Ok(ChatResponse::completed(completion)),
            Err(e) => {
                warn!(
                    client_id = %request.client_id,
                    provider = provider.name(),
                    error = %e,
                    "chat failed, returning error in response"
                );
                Ok(ChatResponse::failed(e.to_string()))
            }
        }
    }

    /// Streaming chat.
    ///
    /// Validation failures are returned before any stream exists. Once the
    /// stream is returned it always ends with exactly one terminal event.
    pub fn chat_stream(&self, request: ChatRequest) -> GatewayResult<ChatStream> {
        let provider = self.resolve_chat(&request.client_id)?;
        let (sink, rx) = TokenSink::channel(self.stream_buffer);

        info!(client_id = %request.client_id, provider = provider.name(), "starting chat stream");
        let task = tokio::spawn(run_stream(provider, request, sink));

        Ok(ChatStream {
            rx,
            task,
            finished: false,
        })
    }

    /// Embedding. Provider failures are returned as errors.
    pub async fn embedding(&self, request: &EmbeddingRequest) -> GatewayResult<EmbeddingResponse> {
        let provider = self.resolve(&request.client_id, Capability::Embedding)?;
        let embedder = match provider.as_embedding() {
            Some(e) if provider.supports_embeddings() => e,
            _ => return Err(unsupported(provider.as_ref(), Capability::Embedding)),
        };

        debug!(client_id = %request.client_id, provider = provider.name(), "dispatching embedding");
        let embedding = embedder
            .generate_embedding(&request.text, &request.model_parameters)
            .await?;
        Ok(EmbeddingResponse { embedding })
    }
}

fn unsupported(provider: &dyn GenerativeProvider, capability: Capability) -> GatewayError {
    GatewayError::CapabilityUnsupported {
        provider: provider.name().to_lowercase(),
        capability,
    }
}

/// Drive one provider stream and close the sink if the provider did not.
async fn run_stream(provider: Arc<dyn GenerativeProvider>, request: ChatRequest, sink: TokenSink) {
    let Some(chat) = provider.as_chat() else {
        let reason = unsupported(provider.as_ref(), Capability::Chat);
        sink.fail(reason.to_string()).await;
        return;
    };

    match chat.stream_chat_response(&request, &sink).await {
        Ok(()) => {
            if sink.complete().await {
                debug!(provider = provider.name(), "provider returned without completing, stream closed");
            }
        }
        Err(ProviderError::Cancelled) => {
            debug!(provider = provider.name(), "chat stream cancelled by caller");
        }
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "chat stream failed");
            sink.fail(e.to_string()).await;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::StreamExt;

    use omnigate_core::types::{ModelParameters, ProviderCapabilitiesRequest, ProviderSelectionRequest};
    use omnigate_core::{Properties, Registry};
    use omnigate_providers::ChatProvider;

    use crate::test_support::echo_registry;

    fn dispatcher() -> Dispatcher {
        let providers = Arc::new(echo_registry());
        let sessions = Arc::new(SessionTable::new(Arc::clone(&providers)));

        sessions.register("c1", None);
        let mut provider_capabilities = BTreeMap::new();
        provider_capabilities.insert(
            "echo".to_string(),
            ProviderCapabilitiesRequest {
                capabilities: vec!["chat".into(), "embedding".into()],
            },
        );
        sessions
            .set_preferred_providers(&ProviderSelectionRequest {
                client_id: "c1".into(),
                provider_capabilities,
            })
            .unwrap();

        Dispatcher::new(providers, sessions, 4)
    }

    fn request(client_id: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            client_id: client_id.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_chat_success() {
        let resp = dispatcher().chat(&request("c1", "hello")).await.unwrap();
        assert_eq!(resp, ChatResponse::completed("hello"));
    }

    #[tokio::test]
    async fn test_chat_provider_failure_is_downgraded() {
        let resp = dispatcher().chat(&request("c1", "boom")).await.unwrap();
        assert_eq!(resp.completion, "Error processing request: exploded");
        assert_eq!(resp.error.as_deref(), Some("exploded"));
    }

    #[tokio::test]
    async fn test_chat_unknown_client() {
        let err = dispatcher().chat(&request("ghost", "hi")).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn test_stream_closes_for_silent_provider() {
        let stream = dispatcher().chat_stream(request("c1", "a b")).unwrap();
        let events: Vec<StreamEvent> = stream.collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("a ".into()),
                StreamEvent::Token("b".into()),
                StreamEvent::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_failure_is_terminal_event() {
        let stream = dispatcher().chat_stream(request("c1", "boom")).unwrap();
        let events: Vec<StreamEvent> = stream.collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Token("boom".into()),
                StreamEvent::Failed("exploded".into()),
            ]
        );
    }

    /// Counts forever and never touches its sink.
    struct Ticker {
        ticks: Arc<AtomicUsize>,
    }

    impl Pluggable for Ticker {
        fn name(&self) -> &str {
            "ticker"
        }

        fn initialize(&mut self, _config: &Properties) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    impl GenerativeProvider for Ticker {
        fn supports_chat(&self) -> bool {
            true
        }

        fn as_chat(&self) -> Option<&dyn ChatProvider> {
            Some(self)
        }
    }

    #[async_trait]
    impl ChatProvider for Ticker {
        async fn generate_chat_response(&self, _request: &ChatRequest) -> Result<String, ProviderError> {
            Ok(String::new())
        }

        async fn stream_chat_response(
            &self,
            _request: &ChatRequest,
            _sink: &TokenSink,
        ) -> Result<(), ProviderError> {
            loop {
                self.ticks.fetch_add(1, AtomicOrdering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_provider() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let props: Properties = [("ticker.enabled", "true")].into_iter().collect();
        let candidates: Vec<Box<dyn GenerativeProvider>> = vec![Box::new(Ticker {
            ticks: Arc::clone(&ticks),
        })];
        let providers = Arc::new(Registry::load(candidates, &props).unwrap());
        let sessions = Arc::new(SessionTable::new(Arc::clone(&providers)));
        sessions.register("c1", None);
        let mut provider_capabilities = BTreeMap::new();
        provider_capabilities.insert(
            "ticker".to_string(),
            ProviderCapabilitiesRequest {
                capabilities: vec!["chat".into()],
            },
        );
        sessions
            .set_preferred_providers(&ProviderSelectionRequest {
                client_id: "c1".into(),
                provider_capabilities,
            })
            .unwrap();
        let dispatcher = Dispatcher::new(providers, sessions, 4);

        let stream = dispatcher.chat_stream(request("c1", "count")).unwrap();
        while ticks.load(AtomicOrdering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        drop(stream);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_drop = ticks.load(AtomicOrdering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(AtomicOrdering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn test_embedding_capability_unsupported() {
        // Echo implements the trait but does not claim the capability.
        let err = dispatcher()
            .embedding(&EmbeddingRequest {
                client_id: "c1".into(),
                text: "x".into(),
                model_parameters: ModelParameters::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::CapabilityUnsupported {
                capability: Capability::Embedding,
                ..
            }
        ));
    }
}
