//! Core building blocks shared by every Omnigate crate.
//!
//! # Architecture
//!
//! - [`capability`] — capability flags and service-level tiers
//! - [`error`] — the gateway error taxonomy and backend `ProviderError`
//! - [`registry`] — name-indexed registry of prefix-configured plugins
//! - [`config`] — flat property map, file/env loading, typed view
//! - [`types`] — chat, embedding, client and provider wire messages
//! - [`vector`] — vector schema, records, metadata values and their messages

pub mod capability;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;
pub mod utils;
pub mod vector;

pub use capability::{Capability, CapabilitySet, ServiceLevel};
pub use config::{GatewayConfig, Properties};
pub use error::{GatewayError, GatewayResult, ProviderError};
pub use registry::{Pluggable, Registry};
