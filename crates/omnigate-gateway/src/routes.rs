//! HTTP routes. One POST per gateway operation under `/v1`, plus
//! `GET /health` and `GET /v1/providers`.
//!
//! Streaming chat answers with Server-Sent Events: a `token` event per
//! fragment (`{"token": "..."}`), then one `done` or `error` event.

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde_json::{json, Value};

use omnigate_core::types::{
    ChatRequest, ChatResponse, ChatResponsePart, ClientRegistrationRequest,
    ClientRegistrationResponse, ClientUnregistrationRequest, ClientUnregistrationResponse,
    EmbeddingRequest, EmbeddingResponse, ProviderCapabilitiesResponse, ProviderRequest,
    ProviderSelectionRequest, ProvidersListResponse, SelectionResponse, StreamEvent,
};
use omnigate_core::utils::timestamp;
use omnigate_core::vector::{
    CollectionStateRequest, CollectionStateResponse, DefineVectorSchemaRequest,
    DefineVectorSchemaResponse, DeleteVectorResponse, GetVectorResponse, SearchVectorsRequest,
    SearchVectorsResponse, UpsertVectorRequest, UpsertVectorResponse, VectorIdRequest,
};

use crate::error::ApiError;
use crate::service::Gateway;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Full router with state attached.
pub fn create_router(gateway: Gateway) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/v1", v1_router())
        .with_state(gateway)
}

fn v1_router() -> Router<Gateway> {
    Router::new()
        .route("/clients/register", post(register_client))
        .route("/clients/unregister", post(unregister_client))
        .route("/providers", get(list_providers))
        .route("/providers/capabilities", post(provider_capabilities))
        .route("/providers/select", post(set_preferred_providers))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/embeddings", post(embedding))
        .route("/vectors/schema", post(define_vector_schema))
        .route("/vectors/upsert", post(upsert_vector))
        .route("/vectors/get", post(get_vector))
        .route("/vectors/delete", post(delete_vector))
        .route("/vectors/search", post(search_vectors))
        .route("/vectors/state", post(collection_state))
}

async fn health_check(State(gateway): State<Gateway>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": timestamp(),
        "providers": gateway.providers().names(),
        "clients": gateway.sessions().len(),
    }))
}

// ─────────────────────────────────────────────
// Clients and providers
// ─────────────────────────────────────────────

async fn register_client(
    State(gateway): State<Gateway>,
    Json(request): Json<ClientRegistrationRequest>,
) -> Json<ClientRegistrationResponse> {
    Json(gateway.register_client(&request))
}

async fn unregister_client(
    State(gateway): State<Gateway>,
    Json(request): Json<ClientUnregistrationRequest>,
) -> Json<ClientUnregistrationResponse> {
    Json(gateway.unregister_client(&request))
}

async fn list_providers(State(gateway): State<Gateway>) -> Json<ProvidersListResponse> {
    Json(gateway.list_providers())
}

async fn provider_capabilities(
    State(gateway): State<Gateway>,
    Json(request): Json<ProviderRequest>,
) -> ApiResult<ProviderCapabilitiesResponse> {
    Ok(Json(gateway.get_provider_capabilities(&request)?))
}

async fn set_preferred_providers(
    State(gateway): State<Gateway>,
    Json(request): Json<ProviderSelectionRequest>,
) -> ApiResult<SelectionResponse> {
    Ok(Json(gateway.set_preferred_providers(&request)?))
}

// ─────────────────────────────────────────────
// Chat and embeddings
// ─────────────────────────────────────────────

async fn chat(
    State(gateway): State<Gateway>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    Ok(Json(gateway.chat(&request).await?))
}

async fn chat_stream(
    State(gateway): State<Gateway>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let stream = gateway.chat_stream(request)?;
    Ok(Sse::new(sse_events(stream)).keep_alive(KeepAlive::default()))
}

fn sse_events(
    stream: impl Stream<Item = StreamEvent>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream.map(|event| match event {
        StreamEvent::Token(token) => Event::default()
            .event("token")
            .json_data(ChatResponsePart { token }),
        StreamEvent::Completed => Ok(Event::default().event("done").data("[DONE]")),
        StreamEvent::Failed(message) => Event::default()
            .event("error")
            .json_data(json!({ "message": message })),
    })
}

async fn embedding(
    State(gateway): State<Gateway>,
    Json(request): Json<EmbeddingRequest>,
) -> ApiResult<EmbeddingResponse> {
    Ok(Json(gateway.embedding(&request).await?))
}

// ─────────────────────────────────────────────
// Vectors
// ─────────────────────────────────────────────

async fn define_vector_schema(
    State(gateway): State<Gateway>,
    Json(request): Json<DefineVectorSchemaRequest>,
) -> ApiResult<DefineVectorSchemaResponse> {
    Ok(Json(gateway.define_vector_schema(&request).await?))
}

async fn upsert_vector(
    State(gateway): State<Gateway>,
    Json(request): Json<UpsertVectorRequest>,
) -> ApiResult<UpsertVectorResponse> {
    Ok(Json(gateway.upsert_vector(request).await?))
}

async fn get_vector(
    State(gateway): State<Gateway>,
    Json(request): Json<VectorIdRequest>,
) -> ApiResult<GetVectorResponse> {
    Ok(Json(gateway.get_vector(&request).await?))
}

async fn delete_vector(
    State(gateway): State<Gateway>,
    Json(request): Json<VectorIdRequest>,
) -> ApiResult<DeleteVectorResponse> {
    Ok(Json(gateway.delete_vector(&request).await?))
}

async fn search_vectors(
    State(gateway): State<Gateway>,
    Json(request): Json<SearchVectorsRequest>,
) -> ApiResult<SearchVectorsResponse> {
    Ok(Json(gateway.search_vectors(&request).await?))
}

async fn collection_state(
    State(gateway): State<Gateway>,
    Json(request): Json<CollectionStateRequest>,
) -> ApiResult<CollectionStateResponse> {
    Ok(Json(gateway.collection_state(&request).await?))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
