//! Wire messages for the caller-facing surface: client registration,
//! provider introspection, capability selection, chat and embeddings.
//!
//! Every message is a flat serde struct. Optional and defaulted fields use
//! `#[serde(default)]` so callers may omit them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::ServiceLevel;

/// Display name stored when a client registers without one.
pub const UNKNOWN_CLIENT_NAME: &str = "Unknown";

// ─────────────────────────────────────────────
// Chat messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message sent to an OpenAI-compatible backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Client registration
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientRegistrationRequest {
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientRegistrationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientUnregistrationRequest {
    pub client_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientUnregistrationResponse {
    pub success: bool,
    pub message: String,
}

// ─────────────────────────────────────────────
// Provider introspection
// ─────────────────────────────────────────────

/// One entry of the provider listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProviderInfo {
    pub provider_name: String,
    pub service_level: ServiceLevel,
    /// `{"chat": true, "embedding": false, ...}`
    pub capabilities: BTreeMap<String, bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProvidersListResponse {
    pub providers: Vec<ProviderInfo>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderRequest {
    #[serde(default)]
    pub client_id: String,
    pub provider: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProviderCapabilitiesResponse {
    pub provider_name: String,
    pub service_level: ServiceLevel,
    pub capabilities: BTreeMap<String, bool>,
}

// ─────────────────────────────────────────────
// Capability selection
// ─────────────────────────────────────────────

/// Capabilities a client wants served by one provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderCapabilitiesRequest {
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// `provider name → capabilities` for one client.
///
/// A `BTreeMap` so the processing order (and with it, last-write-wins when
/// two providers claim the same capability) is the sorted provider order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSelectionRequest {
    pub client_id: String,
    #[serde(default)]
    pub provider_capabilities: BTreeMap<String, ProviderCapabilitiesRequest>,
}

/// One entry that could not be bound.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectionFailure {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SelectionFailure>,
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Sampling parameters. Zero means "let the backend decide".
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LmParameters {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub client_id: String,
    /// Informational; routing uses the client's chat binding.
    #[serde(default)]
    pub provider: String,
    /// Blank → the provider's `default_lm_model`.
    #[serde(default)]
    pub model_name: String,
    pub prompt: String,
    #[serde(default)]
    pub parameters: LmParameters,
}

/// Result of a synchronous chat call.
///
/// A provider failure is reported here (`error` set, `completion` carrying
/// a readable message) instead of failing the call.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub completion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// A successful completion.
    pub fn completed(completion: impl Into<String>) -> Self {
        Self {
            completion: completion.into(),
            error: None,
        }
    }

    /// A provider failure downgraded into the response.
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            completion: format!("Error processing request: {error}"),
            error: Some(error),
        }
    }
}

/// One token fragment of a streamed chat.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatResponsePart {
    pub token: String,
}

/// What a chat stream yields: tokens in generation order, then exactly one
/// terminal event.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Token(String),
    Completed,
    Failed(String),
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token(_))
    }
}

// ─────────────────────────────────────────────
// Embeddings
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelParameters {
    /// Blank → the provider's `default_embedding_model`.
    pub model_name: String,
    /// Requested output dimensions; zero keeps the model's native size.
    pub dimensions: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRequest {
    pub client_id: String,
    pub text: String,
    #[serde(default)]
    pub model_parameters: ModelParameters,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
