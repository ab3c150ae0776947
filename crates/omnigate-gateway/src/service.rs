//! The caller-facing gateway: one method per operation of the external
//! surface, wired over the registries, the session table, the dispatcher
//! and the vector service.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use omnigate_core::types::{
    ChatRequest, ChatResponse, ClientRegistrationRequest, ClientRegistrationResponse,
    ClientUnregistrationRequest, ClientUnregistrationResponse, EmbeddingRequest,
    EmbeddingResponse, ProviderCapabilitiesResponse, ProviderRequest, ProviderSelectionRequest,
    ProvidersListResponse, SelectionResponse,
};
use omnigate_core::vector::{
    CollectionStateRequest, CollectionStateResponse, DefineVectorSchemaRequest,
    DefineVectorSchemaResponse, DeleteVectorResponse, GetVectorResponse, SearchVectorsRequest,
    SearchVectorsResponse, UpsertVectorRequest, UpsertVectorResponse, VectorIdRequest,
};
use omnigate_core::{GatewayConfig, GatewayResult};
use omnigate_providers::{load_providers, ProviderRegistry};
use omnigate_vectordb::{load_vector_stores, VectorStoreRegistry};

use crate::dispatcher::{ChatStream, Dispatcher};
use crate::session::SessionTable;
use crate::vector_service::VectorService;

/// Shared gateway state. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    providers: Arc<ProviderRegistry>,
    sessions: Arc<SessionTable>,
    dispatcher: Arc<Dispatcher>,
    vectors: Arc<VectorService>,
}

impl Gateway {
    /// Load every configured provider (and vector store, when enabled).
    ///
    /// A provider that fails to initialize aborts startup.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let providers = load_providers(&config.properties)
            .context("failed to load generative providers")?;

        let stores = if config.vector_db.enabled {
            let stores = load_vector_stores(&config.properties, config.vector_db.load_wait)
                .context("failed to load vector stores")?;
            Some(stores)
        } else {
            info!("vector store feature disabled");
            None
        };

        let gateway = Self::with_registries(config, providers, stores);
        info!(
            providers = ?gateway.providers.names(),
            vector_stores = ?gateway.vectors.store_names(),
            "gateway ready"
        );
        Ok(gateway)
    }

    /// Assemble a gateway from already-loaded registries.
    pub fn with_registries(
        config: &GatewayConfig,
        providers: ProviderRegistry,
        stores: Option<VectorStoreRegistry>,
    ) -> Self {
        let providers = Arc::new(providers);
        let sessions = Arc::new(SessionTable::new(Arc::clone(&providers)));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&providers),
            Arc::clone(&sessions),
            config.stream.buffer,
        ));
        let vectors = Arc::new(VectorService::new(
            stores.map(Arc::new),
            &config.vector_db,
        ));

        Self {
            providers,
            sessions,
            dispatcher,
            vectors,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    // ─────────────────────────────────────────────
    // Clients
    // ─────────────────────────────────────────────

    pub fn register_client(&self, request: &ClientRegistrationRequest) -> ClientRegistrationResponse {
        self.sessions
            .register(&request.client_id, request.client_name.as_deref())
    }

    pub fn unregister_client(
        &self,
        request: &ClientUnregistrationRequest,
    ) -> ClientUnregistrationResponse {
        self.sessions.unregister(&request.client_id)
    }

    // ─────────────────────────────────────────────
    // Providers
    // ─────────────────────────────────────────────

    /// Every loaded provider with its capabilities, sorted by name.
    pub fn list_providers(&self) -> ProvidersListResponse {
        ProvidersListResponse {
            providers: self.providers.providers().iter().map(|p| p.info()).collect(),
        }
    }

    pub fn get_provider_capabilities(
        &self,
        request: &ProviderRequest,
    ) -> GatewayResult<ProviderCapabilitiesResponse> {
        let info = self.providers.get(&request.provider)?.info();
        Ok(ProviderCapabilitiesResponse {
            provider_name: info.provider_name,
            service_level: info.service_level,
            capabilities: info.capabilities,
        })
    }

    pub fn set_preferred_providers(
        &self,
        request: &ProviderSelectionRequest,
    ) -> GatewayResult<SelectionResponse> {
        self.sessions.set_preferred_providers(request)
    }

    // ─────────────────────────────────────────────
    // Chat and embeddings
    // ─────────────────────────────────────────────

    pub async fn chat(&self, request: &ChatRequest) -> GatewayResult<ChatResponse> {
        self.dispatcher.chat(request).await
    }

    pub fn chat_stream(&self, request: ChatRequest) -> GatewayResult<ChatStream> {
        self.dispatcher.chat_stream(request)
    }

    pub async fn embedding(&self, request: &EmbeddingRequest) -> GatewayResult<EmbeddingResponse> {
        self.dispatcher.embedding(request).await
    }

    // ─────────────────────────────────────────────
    // Vectors
    // ─────────────────────────────────────────────

    pub async fn define_vector_schema(
        &self,
        request: &DefineVectorSchemaRequest,
    ) -> GatewayResult<DefineVectorSchemaResponse> {
        self.vectors.define_vector_schema(request).await
    }

    pub async fn upsert_vector(
        &self,
        request: UpsertVectorRequest,
    ) -> GatewayResult<UpsertVectorResponse> {
        self.vectors.upsert_vector(request).await
    }

    pub async fn get_vector(&self, request: &VectorIdRequest) -> GatewayResult<GetVectorResponse> {
        self.vectors.get_vector(request).await
    }

    pub async fn delete_vector(
        &self,
        request: &VectorIdRequest,
    ) -> GatewayResult<DeleteVectorResponse> {
        self.vectors.delete_vector(request).await
    }

    pub async fn search_vectors(
        &self,
        request: &SearchVectorsRequest,
    ) -> GatewayResult<SearchVectorsResponse> {
        self.vectors.search_vectors(request).await
    }

    pub async fn collection_state(
        &self,
        request: &CollectionStateRequest,
    ) -> GatewayResult<CollectionStateResponse> {
        self.vectors.collection_state(request).await
    }
}
