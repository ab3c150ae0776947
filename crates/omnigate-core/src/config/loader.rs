//! Config loader — reads the config file, merges env vars, derives the typed
//! view.
//!
//! # Loading precedence
//! 1. Defaults (from `GatewayConfig::default()`)
//! 2. Config file: `~/.omnigate/config.json` or an explicit path. JSON is
//!    flattened into dotted keys; `*.properties` files are read as
//!    `key=value` lines.
//! 3. Environment variables `OMNIGATE__<SECTION>__<FIELD>` (override the file)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::properties::Properties;
use super::schema::GatewayConfig;

/// Prefix marking environment overrides.
const ENV_PREFIX: &str = "OMNIGATE__";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) plus env vars.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    let mut properties = load_properties_from_path(&config_path)?;
    properties.merge(env_overrides(std::env::vars()));

    debug!(keys = properties.len(), "configuration assembled");
    GatewayConfig::from_properties(properties)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))
}

/// Read the flat property map from a file.
fn load_properties_from_path(path: &Path) -> Result<Properties> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(Properties::new());
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let is_properties = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("properties"));

    if is_properties {
        return Ok(Properties::parse(&content));
    }

    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config JSON {}", path.display()))?;
    Ok(Properties::from_json(&raw))
}

/// Collect `OMNIGATE__A__B=value` variables as `a.b = value`.
fn env_overrides<I>(vars: I) -> Properties
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let rest = name.strip_prefix(ENV_PREFIX)?;
            if rest.is_empty() {
                return None;
            }
            let key = rest.to_lowercase().replace("__", ".");
            debug!(key = %key, "applying env override");
            Some((key, value))
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
