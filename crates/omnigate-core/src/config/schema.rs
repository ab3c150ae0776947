//! Typed view over the flat [`Properties`] map.
//!
//! Only gateway-level settings are typed here. Provider settings stay in the
//! flat map and are handed to each provider as its own prefix slice.

use std::time::Duration;

use anyhow::{anyhow, Result};

use super::properties::Properties;

// ─────────────────────────────────────────────
// Keys and defaults
// ─────────────────────────────────────────────

pub const KEY_SERVER_HOST: &str = "server.host";
pub const KEY_SERVER_PORT: &str = "server.port";
pub const KEY_VECTORDB_ENABLED: &str = "feature.vectordb.enabled";
pub const KEY_VECTORDB_DEFAULT_PROVIDER: &str = "vectordb.default_provider";
pub const KEY_VECTORDB_COLLECTION: &str = "vectordb.collection";
pub const KEY_VECTORDB_POLL_INTERVAL_MS: &str = "vectordb.load.poll_interval_ms";
pub const KEY_VECTORDB_MAX_ATTEMPTS: &str = "vectordb.load.max_attempts";
pub const KEY_STREAM_BUFFER: &str = "stream.buffer";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 50051;
const DEFAULT_COLLECTION: &str = "vectors";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_ATTEMPTS: u32 = 120;
const DEFAULT_STREAM_BUFFER: usize = 64;

// ─────────────────────────────────────────────
// Root config
// ─────────────────────────────────────────────

/// Root configuration — the raw property map plus the typed gateway settings
/// derived from it.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server: ServerSettings,
    pub vector_db: VectorDbSettings,
    pub stream: StreamSettings,
    /// Every loaded key, including the provider slices.
    pub properties: Properties,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            vector_db: VectorDbSettings::default(),
            stream: StreamSettings::default(),
            properties: Properties::new(),
        }
    }
}

impl GatewayConfig {
    /// Derive the typed settings from a property map.
    ///
    /// Fails on present-but-invalid values; absent keys take their defaults.
    pub fn from_properties(properties: Properties) -> Result<Self> {
        let parse_err = |e: String| anyhow!(e);

        let server = ServerSettings {
            host: properties.get_or(KEY_SERVER_HOST, DEFAULT_HOST).to_string(),
            port: properties
                .get_parsed(KEY_SERVER_PORT)
                .map_err(parse_err)?
                .unwrap_or(DEFAULT_PORT),
        };

        let poll_interval_ms: u64 = properties
            .get_parsed(KEY_VECTORDB_POLL_INTERVAL_MS)
            .map_err(parse_err)?
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let max_attempts: u32 = properties
            .get_parsed(KEY_VECTORDB_MAX_ATTEMPTS)
            .map_err(parse_err)?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let vector_db = VectorDbSettings {
            enabled: properties.get_bool(KEY_VECTORDB_ENABLED).unwrap_or(false),
            default_provider: properties
                .get_non_empty(KEY_VECTORDB_DEFAULT_PROVIDER)
                .map(str::to_lowercase),
            collection: properties
                .get_non_empty(KEY_VECTORDB_COLLECTION)
                .unwrap_or(DEFAULT_COLLECTION)
                .to_string(),
            load_wait: LoadWaitSettings {
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_attempts: max_attempts.max(1),
            },
        };

        let stream = StreamSettings {
            buffer: properties
                .get_parsed::<usize>(KEY_STREAM_BUFFER)
                .map_err(parse_err)?
                .unwrap_or(DEFAULT_STREAM_BUFFER)
                .max(1),
        };

        Ok(Self {
            server,
            vector_db,
            stream,
            properties,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ─────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────

/// Listener settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Vector store feature settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorDbSettings {
    /// `feature.vectordb.enabled` — when false no vector registry is built.
    pub enabled: bool,
    /// Provider used when a request names none.
    pub default_provider: Option<String>,
    /// Collection used when a request names none.
    pub collection: String,
    pub load_wait: LoadWaitSettings,
}

impl Default for VectorDbSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default_provider: None,
            collection: DEFAULT_COLLECTION.to_string(),
            load_wait: LoadWaitSettings::default(),
        }
    }
}

/// Bounds for the poll-until-loaded wait before a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadWaitSettings {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for LoadWaitSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Streaming chat settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSettings {
    /// Capacity of the per-call token channel.
    pub buffer: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_map() {
        let config = GatewayConfig::from_properties(Properties::new()).unwrap();
        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.bind_address(), "127.0.0.1:50051");
        assert!(!config.vector_db.enabled);
        assert_eq!(config.vector_db.collection, "vectors");
        assert_eq!(config.vector_db.load_wait.max_attempts, 120);
        assert_eq!(config.stream.buffer, 64);
    }

    #[test]
    fn test_values_are_read() {
        let props: Properties = [
            ("server.host", "0.0.0.0"),
            ("server.port", "9000"),
            ("feature.vectordb.enabled", "true"),
            ("vectordb.default_provider", "Memory"),
            ("vectordb.collection", "docs"),
            ("vectordb.load.poll_interval_ms", "10"),
            ("vectordb.load.max_attempts", "0"),
        ]
        .into_iter()
        .collect();

        let config = GatewayConfig::from_properties(props).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert!(config.vector_db.enabled);
        assert_eq!(config.vector_db.default_provider.as_deref(), Some("memory"));
        assert_eq!(config.vector_db.collection, "docs");
        assert_eq!(config.vector_db.load_wait.poll_interval, Duration::from_millis(10));
        // Clamped: at least one attempt.
        assert_eq!(config.vector_db.load_wait.max_attempts, 1);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let props: Properties = [("server.port", "99999")].into_iter().collect();
        let err = GatewayConfig::from_properties(props).unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }
}
