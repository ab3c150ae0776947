//! Vector store layer for Omnigate.
//!
//! # Architecture
//!
//! - [`traits::VectorStoreProvider`] — what the gateway calls
//! - [`traits::CollectionBackend`] — primitive operations of one storage engine
//! - [`lifecycle::ManagedVectorStore`] — schema/index/load state machine over a backend
//! - [`metadata`] — JSON codec for the metadata column
//! - [`memory::InMemoryBackend`] — the built-in `memory` engine
//! - [`registry`] — catalog and configuration-driven loading

pub mod lifecycle;
pub mod memory;
pub mod metadata;
pub mod registry;
pub mod traits;

pub use lifecycle::ManagedVectorStore;
pub use memory::InMemoryBackend;
pub use registry::{discover_all, load_vector_stores, VectorStoreRegistry};
pub use traits::{CollectionBackend, LoadState, ScoredRow, StoredRow, VectorStoreProvider};
