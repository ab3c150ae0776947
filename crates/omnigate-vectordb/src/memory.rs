//! In-memory collection backend.
//!
//! Stores rows in concurrent hash maps; nothing is persisted. Collections go
//! through the same create → index → load steps as a real engine, and the
//! load can be made to take a few polls (`load_delay_polls`) or to fail
//! (`fail_load`), which makes the lifecycle observable in development.
//!
//! Enabled by any `memory.*` configuration key, e.g. `memory.enabled=true`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use omnigate_core::vector::VectorSchema;
use omnigate_core::{Properties, ProviderError};

use crate::traits::{CollectionBackend, LoadState, ScoredRow, StoredRow};

pub const PROVIDER_NAME: &str = "memory";

const KEY_LOAD_DELAY_POLLS: &str = "load_delay_polls";
const KEY_FAIL_LOAD: &str = "fail_load";

/// Load progress of one collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Load {
    Idle,
    Pending { remaining: u32 },
    Done,
    Failed,
}

struct MemCollection {
    schema: VectorSchema,
    rows: HashMap<String, StoredRow>,
    indexed: bool,
    load: Load,
}

/// In-memory storage engine.
pub struct InMemoryBackend {
    collections: DashMap<String, MemCollection>,
    /// `load_state` polls answered with `Loading` before `Loaded`.
    load_delay_polls: u32,
    /// Every load request fails.
    fail_load: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            load_delay_polls: 0,
            fail_load: false,
        }
    }

    fn not_found(collection: &str) -> ProviderError {
        ProviderError::Backend(format!("collection '{collection}' not found"))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionBackend for InMemoryBackend {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn initialize(&mut self, config: &Properties) -> Result<(), ProviderError> {
        self.load_delay_polls = config
            .get_parsed::<u32>(KEY_LOAD_DELAY_POLLS)
            .map_err(|e| ProviderError::config(PROVIDER_NAME, e))?
            .unwrap_or(0);
        self.fail_load = config.get_bool(KEY_FAIL_LOAD).unwrap_or(false);
        debug!(
            load_delay_polls = self.load_delay_polls,
            fail_load = self.fail_load,
            "in-memory vector backend configured"
        );
        Ok(())
    }

    async fn has_collection(&self, collection: &str) -> Result<bool, ProviderError> {
        Ok(self.collections.contains_key(collection))
    }

    async fn create_collection(
        &self,
        collection: &str,
        schema: &VectorSchema,
    ) -> Result<(), ProviderError> {
        match self.collections.entry(collection.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(ProviderError::Backend(format!(
                "collection '{collection}' already exists"
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(MemCollection {
                    schema: schema.clone(),
                    rows: HashMap::new(),
                    indexed: false,
                    load: Load::Idle,
                });
                Ok(())
            }
        }
    }

    async fn describe_collection(
        &self,
        collection: &str,
    ) -> Result<Option<VectorSchema>, ProviderError> {
        Ok(self.collections.get(collection).map(|c| c.schema.clone()))
    }

    async fn has_index(&self, collection: &str) -> Result<bool, ProviderError> {
        self.collections
            .get(collection)
            .map(|c| c.indexed)
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn create_index(&self, collection: &str) -> Result<(), ProviderError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        coll.indexed = true;
        Ok(())
    }

    async fn load_collection(&self, collection: &str) -> Result<(), ProviderError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        if !coll.indexed {
            return Err(ProviderError::Backend(format!(
                "collection '{collection}' has no index"
            )));
        }
        coll.load = match coll.load {
            Load::Done => Load::Done,
            _ if self.fail_load => Load::Failed,
            _ => Load::Pending {
                remaining: self.load_delay_polls,
            },
        };
        Ok(())
    }

    async fn load_state(&self, collection: &str) -> Result<LoadState, ProviderError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        let state = match coll.load {
            Load::Idle | Load::Failed => LoadState::NotLoad,
            Load::Done => LoadState::Loaded,
            Load::Pending { remaining: 0 } => {
                coll.load = Load::Done;
                LoadState::Loaded
            }
            Load::Pending { remaining } => {
                coll.load = Load::Pending {
                    remaining: remaining - 1,
                };
                LoadState::Loading
            }
        };
        Ok(state)
    }

    async fn upsert(&self, collection: &str, row: StoredRow) -> Result<(), ProviderError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        coll.rows.insert(row.id.clone(), row);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredRow>, ProviderError> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        Ok(coll.rows.get(id).cloned())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ProviderError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        Ok(coll.rows.remove(id).is_some())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRow>, ProviderError> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        if coll.load != Load::Done {
            return Err(ProviderError::Backend(format!(
                "collection '{collection}' is not loaded"
            )));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = compute_norm(query);

        // Min-heap of the best `top_k` so far.
        let mut heap: BinaryHeap<ScoredItem<'_>> =
            BinaryHeap::with_capacity(top_k.min(coll.rows.len()) + 1);
        for row in coll.rows.values() {
            let item = ScoredItem {
                score: cosine_similarity_with_norm(query, &row.embedding, query_norm),
                id: &row.id,
            };
            if heap.len() < top_k {
                heap.push(item);
            } else if heap.peek().is_some_and(|min| item.cmp(min) == Ordering::Less) {
                heap.pop();
                heap.push(item);
            }
        }

        // Ascending in heap order is best first.
        let ranked = heap.into_sorted_vec();
        Ok(ranked
            .into_iter()
            .filter_map(|item| {
                coll.rows.get(item.id).map(|row| ScoredRow {
                    row: row.clone(),
                    score: item.score,
                })
            })
            .collect())
    }
}

// ─────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────

/// Heap entry ordered so that "greater" means "worse": the heap top is the
/// weakest of the kept candidates. Ties on score fall back to id order.
#[derive(PartialEq)]
struct ScoredItem<'a> {
    score: f32,
    id: &'a str,
}

impl Eq for ScoredItem<'_> {}

impl Ord for ScoredItem<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(other.id))
    }
}

impl PartialOrd for ScoredItem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// L2 norm of a vector.
fn compute_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity in `[-1, 1]` with a precomputed query norm.
fn cosine_similarity_with_norm(a: &[f32], b: &[f32], norm_a: f32) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_b = compute_norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
