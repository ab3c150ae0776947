//! Collection lifecycle — turns a [`CollectionBackend`] into a
//! [`VectorStoreProvider`].
//!
//! ```text
//! Undefined ──define──▶ SchemaDefined ──index──▶ Indexed ──load──▶ Loaded ──confirmed──▶ Queryable
//! ```
//!
//! - `define_vector_schema` creates the collection when absent, then builds
//!   the index and requests a load when no index exists yet.
//! - upsert/get/delete need the schema; search additionally waits until the
//!   backend reports the collection loaded, polling at a fixed interval for
//!   at most `max_attempts` polls.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::{debug, info, warn};

use omnigate_core::config::LoadWaitSettings;
use omnigate_core::vector::{SchemaState, VectorRecord, VectorSchema, VectorSearchResult};
use omnigate_core::{GatewayError, GatewayResult, Pluggable, Properties, ProviderError};

use crate::metadata;
use crate::traits::{CollectionBackend, LoadState, StoredRow, VectorStoreProvider};

/// A backend wrapped with lifecycle checks and the metadata codec.
pub struct ManagedVectorStore<B> {
    backend: B,
    load_wait: LoadWaitSettings,
    /// Schemas of collections known to exist.
    schemas: DashMap<String, VectorSchema>,
    /// Collections whose load was confirmed before serving a search.
    queryable: DashSet<String>,
}

impl<B: CollectionBackend> ManagedVectorStore<B> {
    pub fn new(backend: B, load_wait: LoadWaitSettings) -> Self {
        Self {
            backend,
            load_wait,
            schemas: DashMap::new(),
            queryable: DashSet::new(),
        }
    }

    /// Schema of `collection`, or `SchemaNotDefined`.
    async fn require_schema(&self, collection: &str) -> GatewayResult<VectorSchema> {
        if let Some(schema) = self.schemas.get(collection) {
            return Ok(schema.clone());
        }
        match self.backend.describe_collection(collection).await? {
            Some(schema) => {
                self.schemas.insert(collection.to_string(), schema.clone());
                Ok(schema)
            }
            None => Err(GatewayError::SchemaNotDefined(collection.to_string())),
        }
    }

    fn check_dimension(
        collection: &str,
        schema: &VectorSchema,
        embedding: &[f32],
    ) -> GatewayResult<()> {
        if embedding.len() != schema.embedding_dimension {
            return Err(GatewayError::DimensionMismatch {
                collection: collection.to_string(),
                expected: schema.embedding_dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Build the index and request a load, unless an index already exists.
    async fn ensure_indexed(&self, collection: &str) -> GatewayResult<()> {
        if self.backend.has_index(collection).await? {
            debug!(collection, "index already exists");
            return Ok(());
        }
        self.backend.create_index(collection).await?;
        info!(collection, "index created");
        self.backend.load_collection(collection).await?;
        info!(collection, "load requested");
        Ok(())
    }

    /// Block until the backend reports `collection` loaded.
    async fn ensure_loaded(&self, collection: &str) -> GatewayResult<()> {
        let not_loaded = |reason: String| GatewayError::CollectionNotLoaded {
            collection: collection.to_string(),
            reason,
        };

        match self.backend.load_state(collection).await? {
            LoadState::Loaded => {
                self.queryable.insert(collection.to_string());
                return Ok(());
            }
            LoadState::NotLoad => {
                info!(collection, "loading collection");
                self.backend.load_collection(collection).await?;
            }
            LoadState::Loading => {}
        }

        let LoadWaitSettings {
            poll_interval,
            max_attempts,
        } = self.load_wait;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(poll_interval).await;
            match self.backend.load_state(collection).await? {
                LoadState::Loaded => {
                    info!(collection, attempt, "collection loaded");
                    self.queryable.insert(collection.to_string());
                    return Ok(());
                }
                LoadState::NotLoad => {
                    warn!(collection, attempt, "collection load failed");
                    return Err(not_loaded("load failed".to_string()));
                }
                LoadState::Loading => {
                    debug!(collection, attempt, "waiting for collection to load");
                }
            }
        }

        warn!(collection, max_attempts, "gave up waiting for collection load");
        Err(not_loaded(format!(
            "still loading after {max_attempts} attempts"
        )))
    }
}

impl<B: CollectionBackend> Pluggable for ManagedVectorStore<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError> {
        self.backend.initialize(config)
    }
}

#[async_trait]
impl<B: CollectionBackend> VectorStoreProvider for ManagedVectorStore<B> {
    async fn define_vector_schema(
        &self,
        collection: &str,
        schema: &VectorSchema,
    ) -> GatewayResult<SchemaState> {
        if schema.embedding_dimension == 0 {
            return Err(GatewayError::InvalidRequest(
                "embedding_dimension must be positive".to_string(),
            ));
        }

        if self.backend.has_collection(collection).await? {
            info!(collection, "collection already exists, keeping it");
        } else if let Err(e) = self.backend.create_collection(collection, schema).await {
            // Lost a race with a concurrent define: the collection is there now.
            if !self.backend.has_collection(collection).await? {
                return Err(e.into());
            }
        } else {
            info!(
                collection,
                dimension = schema.embedding_dimension,
                fields = schema.fields.len(),
                "collection created"
            );
        }

        // Cache whatever schema the store actually holds.
        if let Some(existing) = self.backend.describe_collection(collection).await? {
            self.schemas.insert(collection.to_string(), existing);
        }

        self.ensure_indexed(collection).await?;
        Ok(SchemaState::SchemaDefined)
    }

    async fn upsert_vector(&self, collection: &str, record: VectorRecord) -> GatewayResult<String> {
        let schema = self.require_schema(collection).await?;
        Self::check_dimension(collection, &schema, &record.embedding)?;
        if record.id.is_empty() {
            return Err(GatewayError::InvalidRequest("vector id must not be empty".to_string()));
        }

        let metadata = if schema.has_metadata() {
            metadata::validate(&schema, &record.metadata)?;
            Some(metadata::encode(&record.metadata))
        } else if record.metadata.is_empty() {
            None
        } else {
            return Err(GatewayError::InvalidRequest(format!(
                "collection '{collection}' was defined without metadata fields"
            )));
        };

        let id = record.id.clone();
        self.backend
            .upsert(
                collection,
                StoredRow {
                    id: record.id,
                    embedding: record.embedding,
                    content: record.content,
                    metadata,
                },
            )
            .await?;
        debug!(collection, id = %id, "vector upserted");
        Ok(id)
    }

    async fn get_vector(&self, collection: &str, id: &str) -> GatewayResult<Option<VectorRecord>> {
        self.require_schema(collection).await?;
        let Some(row) = self.backend.get(collection, id).await? else {
            return Ok(None);
        };
        let metadata = metadata::decode(row.metadata.as_deref().unwrap_or_default())?;
        Ok(Some(VectorRecord {
            id: row.id,
            embedding: row.embedding,
            content: row.content,
            metadata,
        }))
    }

    async fn delete_vector(&self, collection: &str, id: &str) -> GatewayResult<bool> {
        self.require_schema(collection).await?;
        let found = self.backend.delete(collection, id).await?;
        debug!(collection, id, found, "vector delete");
        Ok(found)
    }

    async fn search_vectors(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> GatewayResult<Vec<VectorSearchResult>> {
        let schema = self.require_schema(collection).await?;
        Self::check_dimension(collection, &schema, query)?;
        self.ensure_loaded(collection).await?;

        let hits = self.backend.search(collection, query, top_k).await?;
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let metadata = metadata::decode(hit.row.metadata.as_deref().unwrap_or_default())?;
            results.push(VectorSearchResult {
                id: hit.row.id,
                score: hit.score,
                embedding: Some(hit.row.embedding),
                content: Some(hit.row.content),
                metadata,
            });
        }
        Ok(results)
    }

    async fn collection_state(&self, collection: &str) -> GatewayResult<SchemaState> {
        if !self.backend.has_collection(collection).await? {
            return Ok(SchemaState::Undefined);
        }
        if !self.backend.has_index(collection).await? {
            return Ok(SchemaState::SchemaDefined);
        }
        let state = match self.backend.load_state(collection).await? {
            LoadState::NotLoad | LoadState::Loading => SchemaState::Indexed,
            LoadState::Loaded if self.queryable.contains(collection) => SchemaState::Queryable,
            LoadState::Loaded => SchemaState::Loaded,
        };
        Ok(state)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use omnigate_core::vector::{FieldType, Metadata, MetadataValue};

    use crate::memory::InMemoryBackend;

    fn fast_wait(max_attempts: u32) -> LoadWaitSettings {
        LoadWaitSettings {
            poll_interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    fn store_with(pairs: &[(&str, &str)], max_attempts: u32) -> ManagedVectorStore<InMemoryBackend> {
        let mut store = ManagedVectorStore::new(InMemoryBackend::new(), fast_wait(max_attempts));
        let config: Properties = pairs.iter().copied().collect();
        store.initialize(&config).unwrap();
        store
    }

    fn store() -> ManagedVectorStore<InMemoryBackend> {
        store_with(&[("enabled", "true")], 10)
    }

    fn record(id: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            embedding,
            content: format!("doc {id}"),
            metadata: Metadata::new(),
        }
    }

    fn schema8() -> VectorSchema {
        VectorSchema::new(8).with_field("year", FieldType::Integer)
    }

    fn unit(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; 8];
        v[i] = 1.0;
        v
    }

    #[tokio::test]
    async fn test_operations_before_define_fail() {
        let store = store();
        assert_eq!(store.collection_state("c").await.unwrap(), SchemaState::Undefined);
        assert!(matches!(
            store.upsert_vector("c", record("a", unit(0))).await,
            Err(GatewayError::SchemaNotDefined(_))
        ));
        assert!(matches!(
            store.get_vector("c", "a").await,
            Err(GatewayError::SchemaNotDefined(_))
        ));
        assert!(matches!(
            store.search_vectors("c", &unit(0), 1).await,
            Err(GatewayError::SchemaNotDefined(_))
        ));
    }

    #[tokio::test]
    async fn test_define_is_idempotent_and_keeps_data() {
        let store = store();
        assert_eq!(
            store.define_vector_schema("c", &schema8()).await.unwrap(),
            SchemaState::SchemaDefined
        );
        store.upsert_vector("c", record("a", unit(0))).await.unwrap();

        // A different schema on redefinition does not replace the existing one.
        assert_eq!(
            store.define_vector_schema("c", &VectorSchema::new(4)).await.unwrap(),
            SchemaState::SchemaDefined
        );
        assert!(store.get_vector("c", "a").await.unwrap().is_some());
        assert!(matches!(
            store.upsert_vector("c", record("b", vec![1.0; 4])).await,
            Err(GatewayError::DimensionMismatch { expected: 8, actual: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_dimension_rejected() {
        let store = store();
        assert!(matches!(
            store.define_vector_schema("c", &VectorSchema::new(0)).await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let store = store_with(&[("load_delay_polls", "1")], 10);
        store.define_vector_schema("c", &schema8()).await.unwrap();
        assert_eq!(store.collection_state("c").await.unwrap(), SchemaState::Indexed);
        // The first poll above consumed the delay.
        assert_eq!(store.collection_state("c").await.unwrap(), SchemaState::Loaded);

        store.search_vectors("c", &unit(0), 1).await.unwrap();
        assert_eq!(store.collection_state("c").await.unwrap(), SchemaState::Queryable);
    }

    #[tokio::test]
    async fn test_search_top_k_ordered() {
        let store = store();
        store.define_vector_schema("c", &schema8()).await.unwrap();
        let mut close = unit(0);
        close[1] = 0.2;
        store.upsert_vector("c", record("exact", unit(0))).await.unwrap();
        store.upsert_vector("c", record("close", close)).await.unwrap();
        store.upsert_vector("c", record("far", unit(5))).await.unwrap();

        let results = store.search_vectors("c", &unit(0), 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "exact");
        assert_eq!(results[1].id, "close");
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].content.as_deref(), Some("doc exact"));
    }

    #[tokio::test]
    async fn test_search_waits_for_delayed_load() {
        let store = store_with(&[("load_delay_polls", "3")], 10);
        store.define_vector_schema("c", &schema8()).await.unwrap();
        store.upsert_vector("c", record("a", unit(0))).await.unwrap();
        let results = store.search_vectors("c", &unit(0), 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_gives_up_after_max_attempts() {
        let store = store_with(&[("load_delay_polls", "50")], 3);
        store.define_vector_schema("c", &schema8()).await.unwrap();
        let err = store.search_vectors("c", &unit(0), 1).await.unwrap_err();
        match err {
            GatewayError::CollectionNotLoaded { reason, .. } => {
                assert!(reason.contains("3 attempts"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_load_is_fatal() {
        let store = store_with(&[("fail_load", "true")], 10);
        store.define_vector_schema("c", &schema8()).await.unwrap();
        let err = store.search_vectors("c", &unit(0), 1).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::CollectionNotLoaded { ref reason, .. } if reason == "load failed"
        ));
    }

    #[tokio::test]
    async fn test_metadata_round_trip_and_validation() {
        let store = store();
        store.define_vector_schema("c", &schema8()).await.unwrap();

        let mut rec = record("a", unit(0));
        rec.metadata.insert("year".into(), MetadataValue::IntValue(1928));
        rec.metadata.insert("title".into(), MetadataValue::StringValue("Willie".into()));
        store.upsert_vector("c", rec.clone()).await.unwrap();
        assert_eq!(store.get_vector("c", "a").await.unwrap(), Some(rec));

        let mut bad = record("b", unit(1));
        bad.metadata.insert("year".into(), MetadataValue::FloatValue(1.5));
        assert!(matches!(
            store.upsert_vector("c", bad).await,
            Err(GatewayError::UnsupportedMetadataType { .. })
        ));
    }

    #[tokio::test]
    async fn test_metadata_without_column_rejected() {
        let store = store();
        store.define_vector_schema("plain", &VectorSchema::new(8)).await.unwrap();
        let mut rec = record("a", unit(0));
        rec.metadata.insert("k".into(), MetadataValue::IntValue(1));
        assert!(matches!(
            store.upsert_vector("plain", rec).await,
            Err(GatewayError::InvalidRequest(_))
        ));
        store.upsert_vector("plain", record("b", unit(0))).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_an_error() {
        let store = store();
        store.define_vector_schema("c", &schema8()).await.unwrap();
        assert!(!store.delete_vector("c", "ghost").await.unwrap());
        store.upsert_vector("c", record("a", unit(0))).await.unwrap();
        assert!(store.delete_vector("c", "a").await.unwrap());
        assert!(store.get_vector("c", "a").await.unwrap().is_none());
    }
}
