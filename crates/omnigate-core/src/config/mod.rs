//! Configuration system — flat property map, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use omnigate_core::config;
//!
//! let cfg = config::load_config(None).unwrap();
//! println!("Listening on {}", cfg.bind_address());
//! ```

pub mod loader;
pub mod properties;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config};
pub use properties::Properties;
pub use schema::{GatewayConfig, LoadWaitSettings, ServerSettings, StreamSettings, VectorDbSettings};
