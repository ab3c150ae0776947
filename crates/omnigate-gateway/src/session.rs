//! Client session table and per-client capability bindings.
//!
//! Two concurrent maps:
//! - `sessions`: client id → [`ClientSession`]
//! - `bindings`: `(client id, capability)` → provider name
//!
//! Operations on one client serialize on that client's `sessions` shard;
//! `bindings` is only ever touched while that shard guard is held, so a
//! client can never be observed registered with stale bindings or
//! unregistered with live ones. Different clients do not block each other
//! beyond shard collisions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use omnigate_core::types::{
    ClientRegistrationResponse, ClientUnregistrationResponse, ProviderSelectionRequest,
    SelectionFailure, SelectionResponse, UNKNOWN_CLIENT_NAME,
};
use omnigate_core::{Capability, GatewayError, GatewayResult};
use omnigate_providers::ProviderRegistry;

/// One registered caller.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientSession {
    pub client_id: String,
    pub client_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Registered clients and what each has bound to every capability.
pub struct SessionTable {
    providers: Arc<ProviderRegistry>,
    sessions: DashMap<String, ClientSession>,
    bindings: DashMap<(String, Capability), String>,
}

impl SessionTable {
    pub fn new(providers: Arc<ProviderRegistry>) -> Self {
        Self {
            providers,
            sessions: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    // ─────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────

    /// Add a client. A duplicate id leaves the table untouched.
    pub fn register(&self, client_id: &str, client_name: Option<&str>) -> ClientRegistrationResponse {
        let name = client_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_CLIENT_NAME);

        match self.sessions.entry(client_id.to_string()) {
            Entry::Occupied(_) => {
                warn!(client_id, "registration rejected, already registered");
                ClientRegistrationResponse {
                    success: false,
                    message: GatewayError::AlreadyRegistered(client_id.to_string()).to_string(),
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(ClientSession {
                    client_id: client_id.to_string(),
                    client_name: name.to_string(),
                    registered_at: Utc::now(),
                });
                info!(client_id, client_name = name, "client registered");
                ClientRegistrationResponse {
                    success: true,
                    message: format!("Client {client_id} registered successfully"),
                }
            }
        }
    }

    /// Remove a client together with all of its bindings.
    pub fn unregister(&self, client_id: &str) -> ClientUnregistrationResponse {
        match self.sessions.entry(client_id.to_string()) {
            Entry::Vacant(_) => {
                warn!(client_id, "unregistration rejected, not registered");
                ClientUnregistrationResponse {
                    success: false,
                    message: GatewayError::NotRegistered(client_id.to_string()).to_string(),
                }
            }
            Entry::Occupied(session) => {
                for capability in Capability::ALL {
                    self.bindings.remove(&(client_id.to_string(), capability));
                }
                session.remove();
                info!(client_id, "client unregistered");
                ClientUnregistrationResponse {
                    success: true,
                    message: format!("Client {client_id} unregistered successfully"),
                }
            }
        }
    }

    pub fn is_registered(&self, client_id: &str) -> bool {
        self.sessions.contains_key(client_id)
    }

    /// Snapshot of one session.
    pub fn session(&self, client_id: &str) -> Option<ClientSession> {
        self.sessions.get(client_id).map(|s| s.value().clone())
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ─────────────────────────────────────────────
    // Bindings
    // ─────────────────────────────────────────────

    /// Bind capabilities to providers for one client.
    ///
    /// An unknown client fails the whole call without any change. Otherwise
    /// every `(provider, capability)` entry is attempted in sorted provider
    /// order; a later entry overwrites an earlier binding of the same
    /// capability. Entries that cannot be bound are reported in `failures`
    /// and do not stop the others.
    pub fn set_preferred_providers(
        &self,
        request: &ProviderSelectionRequest,
    ) -> GatewayResult<SelectionResponse> {
        let client_id = request.client_id.as_str();
        // Held for the whole call so a concurrent unregister cannot interleave.
        let _session = self
            .sessions
            .get(client_id)
            .ok_or_else(|| GatewayError::NotRegistered(client_id.to_string()))?;

        let mut failures = Vec::new();
        let mut bound = 0usize;

        for (provider_name, wanted) in &request.provider_capabilities {
            if let Err(e) = self.providers.get(provider_name) {
                debug!(client_id, provider = %provider_name, "cannot bind unknown provider");
                failures.push(SelectionFailure {
                    provider: provider_name.clone(),
                    capability: None,
                    reason: e.to_string(),
                });
                continue;
            }
            let provider = provider_name.to_lowercase();

            for raw in &wanted.capabilities {
                match raw.parse::<Capability>() {
                    Ok(capability) => {
                        self.bindings.insert(
                            (client_id.to_string(), capability),
                            provider.clone(),
                        );
                        bound += 1;
                        debug!(client_id, provider = %provider, %capability, "capability bound");
                    }
                    Err(e) => failures.push(SelectionFailure {
                        provider: provider_name.clone(),
                        capability: Some(raw.clone()),
                        reason: e.to_string(),
                    }),
                }
            }
        }

        let success = failures.is_empty();
        let message = if success {
            format!("Preferred providers set for client {client_id} ({bound} bindings)")
        } else {
            format!(
                "{bound} bindings set for client {client_id}, {} entries failed",
                failures.len()
            )
        };
        info!(client_id, bound, failed = failures.len(), "preferred providers updated");

        Ok(SelectionResponse {
            success,
            message,
            failures,
        })
    }

    /// Name of the provider bound to `capability` for `client_id`.
    pub fn resolve_provider_for_capability(
        &self,
        client_id: &str,
        capability: Capability,
    ) -> GatewayResult<String> {
        let _session = self
            .sessions
            .get(client_id)
            .ok_or_else(|| GatewayError::NotRegistered(client_id.to_string()))?;

        self.bindings
            .get(&(client_id.to_string(), capability))
            .map(|b| b.value().clone())
            .ok_or_else(|| GatewayError::NoProviderBound {
                client_id: client_id.to_string(),
                capability,
            })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
