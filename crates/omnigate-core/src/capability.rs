//! Capability model — which logical features a provider offers and how
//! complete its implementation is.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

// ─────────────────────────────────────────────
// Capability
// ─────────────────────────────────────────────

/// A named feature a provider may support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Chat,
    Embedding,
    Rag,
    Agents,
}

impl Capability {
    /// Every capability, in reporting order.
    pub const ALL: [Capability; 4] = [
        Capability::Chat,
        Capability::Embedding,
        Capability::Rag,
        Capability::Agents,
    ];

    /// Wire name (`"chat"`, `"embedding"`, `"rag"`, `"agents"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::Embedding => "embedding",
            Capability::Rag => "rag",
            Capability::Agents => "agents",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Capability::Chat),
            "embedding" | "embeddings" => Ok(Capability::Embedding),
            "rag" => Ok(Capability::Rag),
            "agents" => Ok(Capability::Agents),
            _ => Err(GatewayError::UnknownCapability(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// CapabilitySet
// ─────────────────────────────────────────────

/// The fixed set of capability flags reported for one provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub chat: bool,
    pub embedding: bool,
    pub rag: bool,
    pub agents: bool,
}

impl CapabilitySet {
    /// Whether a single capability is set.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Chat => self.chat,
            Capability::Embedding => self.embedding,
            Capability::Rag => self.rag,
            Capability::Agents => self.agents,
        }
    }

    /// Map form used on the wire: `{"agents": false, "chat": true, ...}`.
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        Capability::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), self.supports(*c)))
            .collect()
    }
}

// ─────────────────────────────────────────────
// ServiceLevel
// ─────────────────────────────────────────────

/// Coarse tier describing how feature-complete a provider is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceLevel {
    #[default]
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceLevel::Level1 => "LEVEL_1",
            ServiceLevel::Level2 => "LEVEL_2",
            ServiceLevel::Level3 => "LEVEL_3",
        };
        f.write_str(s)
    }
}
