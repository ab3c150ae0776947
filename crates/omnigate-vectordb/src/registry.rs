//! Vector store catalog and loading.
//!
//! Works like the generative provider registry: every built-in store is
//! offered its `<name>.*` configuration slice and only stores with
//! configuration are initialized.

use omnigate_core::config::LoadWaitSettings;
use omnigate_core::{Properties, ProviderError, Registry};

use crate::lifecycle::ManagedVectorStore;
use crate::memory::InMemoryBackend;
use crate::traits::VectorStoreProvider;

/// Registry of initialized vector stores.
pub type VectorStoreRegistry = Registry<dyn VectorStoreProvider>;

/// Every vector store compiled into this binary, uninitialized.
pub fn discover_all(load_wait: LoadWaitSettings) -> Vec<Box<dyn VectorStoreProvider>> {
    vec![Box::new(ManagedVectorStore::new(
        InMemoryBackend::new(),
        load_wait,
    ))]
}

/// Initialize every configured vector store.
pub fn load_vector_stores(
    properties: &Properties,
    load_wait: LoadWaitSettings,
) -> Result<VectorStoreRegistry, ProviderError> {
    Registry::load(discover_all(load_wait), properties)
}
