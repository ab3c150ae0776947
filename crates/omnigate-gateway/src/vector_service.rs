//! Vector operations: picks the store and collection for each request and
//! maps results onto response messages.
//!
//! Store choice: `request.provider` → `vectordb.default_provider` → first
//! loaded store by name. Collection choice: `request.collection` →
//! `vectordb.collection`.

use std::sync::Arc;

use tracing::debug;

use omnigate_core::config::VectorDbSettings;
use omnigate_core::vector::{
    CollectionStateRequest, CollectionStateResponse, DefineVectorSchemaRequest,
    DefineVectorSchemaResponse, DeleteVectorResponse, GetVectorResponse, SearchVectorsRequest,
    SearchVectorsResponse, UpsertVectorRequest, UpsertVectorResponse, VectorIdRequest,
    VectorRecord,
};
use omnigate_core::{GatewayError, GatewayResult};
use omnigate_vectordb::{VectorStoreProvider, VectorStoreRegistry};

pub struct VectorService {
    /// `None` when the vector store feature is disabled.
    stores: Option<Arc<VectorStoreRegistry>>,
    default_provider: Option<String>,
    default_collection: String,
}

impl VectorService {
    pub fn new(stores: Option<Arc<VectorStoreRegistry>>, settings: &VectorDbSettings) -> Self {
        Self {
            stores,
            default_provider: settings.default_provider.clone(),
            default_collection: settings.collection.clone(),
        }
    }

    /// A service that rejects every call with `VectorStoreDisabled`.
    pub fn disabled() -> Self {
        Self::new(None, &VectorDbSettings::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.stores.is_some()
    }

    /// Names of the loaded stores; empty when disabled.
    pub fn store_names(&self) -> Vec<String> {
        self.stores.as_ref().map(|s| s.names()).unwrap_or_default()
    }

    fn select(
        &self,
        provider: Option<&str>,
        collection: Option<&str>,
    ) -> GatewayResult<(Arc<dyn VectorStoreProvider>, String)> {
        let stores = self.stores.as_ref().ok_or(GatewayError::VectorStoreDisabled)?;

        let name = match non_blank(provider).or(self.default_provider.as_deref()) {
            Some(name) => name.to_string(),
            None => stores.names().into_iter().next().ok_or_else(|| {
                GatewayError::InvalidRequest("no vector store is configured".to_string())
            })?,
        };
        let store = stores.get(&name)?;
        let collection = non_blank(collection)
            .unwrap_or(&self.default_collection)
            .to_string();

        debug!(store = %name, collection = %collection, "vector store selected");
        Ok((store, collection))
    }

    pub async fn define_vector_schema(
        &self,
        request: &DefineVectorSchemaRequest,
    ) -> GatewayResult<DefineVectorSchemaResponse> {
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let state = store
            .define_vector_schema(&collection, &request.schema())
            .await?;
        Ok(DefineVectorSchemaResponse {
            success: true,
            collection,
            state,
        })
    }

    pub async fn upsert_vector(
        &self,
        request: UpsertVectorRequest,
    ) -> GatewayResult<UpsertVectorResponse> {
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let record = VectorRecord {
            id: request.id,
            embedding: request.embedding,
            content: request.content,
            metadata: request.metadata,
        };
        let id = store.upsert_vector(&collection, record).await?;
        Ok(UpsertVectorResponse { id })
    }

    pub async fn get_vector(&self, request: &VectorIdRequest) -> GatewayResult<GetVectorResponse> {
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let record = store.get_vector(&collection, &request.id).await?;
        Ok(record.into())
    }

    /// Deleting an absent id succeeds with `found == false`.
    pub async fn delete_vector(
        &self,
        request: &VectorIdRequest,
    ) -> GatewayResult<DeleteVectorResponse> {
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let found = store.delete_vector(&collection, &request.id).await?;
        Ok(DeleteVectorResponse {
            success: true,
            found,
        })
    }

    pub async fn search_vectors(
        &self,
        request: &SearchVectorsRequest,
    ) -> GatewayResult<SearchVectorsResponse> {
        if request.top_k == 0 {
            return Err(GatewayError::InvalidRequest("top_k must be positive".to_string()));
        }
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let results = store
            .search_vectors(&collection, &request.query_embedding, request.top_k)
            .await?;
        Ok(SearchVectorsResponse { results })
    }

    pub async fn collection_state(
        &self,
        request: &CollectionStateRequest,
    ) -> GatewayResult<CollectionStateResponse> {
        let (store, collection) =
            self.select(request.provider.as_deref(), request.collection.as_deref())?;
        let state = store.collection_state(&collection).await?;
        Ok(CollectionStateResponse { collection, state })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
