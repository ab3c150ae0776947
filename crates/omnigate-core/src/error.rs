//! Error taxonomy.
//!
//! Two layers:
//! - [`ProviderError`] — a backend call (HTTP API, vector store) failed.
//! - [`GatewayError`] — a request could not be served; wraps `ProviderError`
//!   when the failure came from the backend.

use thiserror::Error;

use crate::capability::Capability;

/// Shorthand for results carrying a [`GatewayError`].
pub type GatewayResult<T> = Result<T, GatewayError>;

// ─────────────────────────────────────────────
// ProviderError
// ─────────────────────────────────────────────

/// Failure raised by a provider implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider's configuration slice is unusable.
    #[error("provider '{provider}' is misconfigured: {reason}")]
    Config { provider: String, reason: String },

    /// The provider does not implement the requested operation.
    #[error("{0} is not implemented by this provider")]
    Unsupported(&'static str),

    /// Transport-level failure (connect, timeout, broken body).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The backend answered with a body we could not interpret.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The caller went away while the provider was still producing output.
    #[error("stream closed by caller")]
    Cancelled,

    /// Any other backend-reported failure.
    #[error("{0}")]
    Backend(String),
}

impl ProviderError {
    /// Build a `Config` error for `provider`.
    pub fn config(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        ProviderError::Config {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

// ─────────────────────────────────────────────
// GatewayError
// ─────────────────────────────────────────────

/// Every condition a gateway call can fail with.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("client '{0}' is not registered")]
    NotRegistered(String),

    #[error("client '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("no provider bound to capability '{capability}' for client '{client_id}'")]
    NoProviderBound {
        client_id: String,
        capability: Capability,
    },

    #[error("provider '{provider}' does not support capability '{capability}'")]
    CapabilityUnsupported {
        provider: String,
        capability: Capability,
    },

    #[error("unknown capability '{0}'")]
    UnknownCapability(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("no vector schema defined for collection '{0}'")]
    SchemaNotDefined(String),

    #[error("collection '{collection}' is not loaded: {reason}")]
    CollectionNotLoaded { collection: String, reason: String },

    #[error("unsupported metadata type for field '{field}': {found}")]
    UnsupportedMetadataType { field: String, found: String },

    #[error("embedding has {actual} dimensions, collection '{collection}' expects {expected}")]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("vector store feature is disabled")]
    VectorStoreDisabled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::NotRegistered(_) => "NOT_REGISTERED",
            GatewayError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            GatewayError::ProviderNotFound(_) => "PROVIDER_NOT_FOUND",
            GatewayError::NoProviderBound { .. } => "NO_PROVIDER_BOUND",
            GatewayError::CapabilityUnsupported { .. } => "CAPABILITY_UNSUPPORTED",
            GatewayError::UnknownCapability(_) => "UNKNOWN_CAPABILITY",
            GatewayError::Provider(_) => "PROVIDER_ERROR",
            GatewayError::SchemaNotDefined(_) => "SCHEMA_NOT_DEFINED",
            GatewayError::CollectionNotLoaded { .. } => "COLLECTION_NOT_LOADED",
            GatewayError::UnsupportedMetadataType { .. } => "UNSUPPORTED_METADATA_TYPE",
            GatewayError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            GatewayError::VectorStoreDisabled => "VECTOR_STORE_DISABLED",
            GatewayError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}
