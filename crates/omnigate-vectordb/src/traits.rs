//! Vector store contracts.
//!
//! Two layers:
//! - [`VectorStoreProvider`] — what the gateway calls: schema definition,
//!   upsert/get/delete/search and lifecycle introspection, with every
//!   precondition enforced.
//! - [`CollectionBackend`] — the primitive operations of one storage engine
//!   (collection/index/load management and row access). A backend is turned
//!   into a provider by [`crate::lifecycle::ManagedVectorStore`].

use async_trait::async_trait;

use omnigate_core::vector::{SchemaState, VectorRecord, VectorSchema, VectorSearchResult};
use omnigate_core::{GatewayResult, Pluggable, Properties, ProviderError};

// ─────────────────────────────────────────────
// Provider surface
// ─────────────────────────────────────────────

#[async_trait]
pub trait VectorStoreProvider: Pluggable {
    /// Create `collection` with `schema` unless it exists, then make sure it
    /// is indexed and a load has been requested. Redefining an existing
    /// collection keeps it, and its data, untouched.
    async fn define_vector_schema(
        &self,
        collection: &str,
        schema: &VectorSchema,
    ) -> GatewayResult<SchemaState>;

    /// Insert or replace the record with `record.id`. Returns the id.
    async fn upsert_vector(&self, collection: &str, record: VectorRecord) -> GatewayResult<String>;

    /// `Ok(None)` when no record has this id.
    async fn get_vector(&self, collection: &str, id: &str) -> GatewayResult<Option<VectorRecord>>;

    /// Returns whether a record was removed; absence is not an error.
    async fn delete_vector(&self, collection: &str, id: &str) -> GatewayResult<bool>;

    /// The `top_k` most similar records, best first. Waits (bounded) for the
    /// collection to be loaded.
    async fn search_vectors(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> GatewayResult<Vec<VectorSearchResult>>;

    /// Current lifecycle state of `collection`.
    async fn collection_state(&self, collection: &str) -> GatewayResult<SchemaState>;
}

// ─────────────────────────────────────────────
// Backend primitives
// ─────────────────────────────────────────────

/// Load progress as reported by a storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Not loaded. After a load was requested this means the load failed.
    NotLoad,
    Loading,
    Loaded,
}

/// One row in storage form. `metadata` is the serialized metadata column,
/// absent when the collection was created without one.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredRow {
    pub id: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub metadata: Option<String>,
}

/// A row with its similarity to a query. Higher is more similar.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredRow {
    pub row: StoredRow,
    pub score: f32,
}

/// Primitive operations of a storage engine. No lifecycle checks happen at
/// this level.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Provider name used for registry lookup and config prefix.
    fn name(&self) -> &str;

    fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError>;

    async fn has_collection(&self, collection: &str) -> Result<bool, ProviderError>;

    /// Create a collection: primary key, fixed-width embedding, content and,
    /// when the schema declares fields, a serialized metadata column.
    async fn create_collection(
        &self,
        collection: &str,
        schema: &VectorSchema,
    ) -> Result<(), ProviderError>;

    /// Schema of an existing collection.
    async fn describe_collection(
        &self,
        collection: &str,
    ) -> Result<Option<VectorSchema>, ProviderError>;

    async fn has_index(&self, collection: &str) -> Result<bool, ProviderError>;

    async fn create_index(&self, collection: &str) -> Result<(), ProviderError>;

    /// Request that the collection be loaded for serving. May complete later.
    async fn load_collection(&self, collection: &str) -> Result<(), ProviderError>;

    async fn load_state(&self, collection: &str) -> Result<LoadState, ProviderError>;

    async fn upsert(&self, collection: &str, row: StoredRow) -> Result<(), ProviderError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredRow>, ProviderError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ProviderError>;

    /// Best `top_k` rows for `query`, best first.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRow>, ProviderError>;
}
