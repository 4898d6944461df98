//! External provider connection records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kv::KeyValueStore;

/// Well-known key holding the whole connection collection.
pub const CONNECTIONS_KEY: &str = "siteforge-connections";

/// Supported publishing providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    Vercel,
    Supabase,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Vercel => "vercel",
            Self::Supabase => "supabase",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "vercel" => Ok(Self::Vercel),
            "supabase" => Ok(Self::Supabase),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Credential record for one publishing provider.
///
/// Created by a successful token-verification round trip; never expires
/// automatically and must be manually replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConnection {
    pub provider: ProviderKind,
    pub token: String,
    pub account_id: String,
    pub display_name: String,
    pub connected_at: DateTime<Utc>,
}

/// Keyed store of provider connections; at most one per provider, saving
/// replaces the old one.
pub struct ConnectionStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConnectionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load_all(&self) -> BTreeMap<ProviderKind, IntegrationConnection> {
        let Some(raw) = self.store.get(CONNECTIONS_KEY) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(connections) => connections,
            Err(e) => {
                warn!("Discarding corrupt connection collection: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn persist_all(&self, connections: &BTreeMap<ProviderKind, IntegrationConnection>) -> bool {
        match serde_json::to_string(connections) {
            Ok(serialized) => self.store.set(CONNECTIONS_KEY, &serialized),
            Err(e) => {
                warn!("Failed to serialize connection collection: {}", e);
                false
            }
        }
    }

    pub fn save(&self, connection: IntegrationConnection) -> bool {
        let mut connections = self.load_all();
        connections.insert(connection.provider, connection);
        self.persist_all(&connections)
    }

    pub fn get(&self, provider: ProviderKind) -> Option<IntegrationConnection> {
        self.load_all().remove(&provider)
    }

    pub fn list(&self) -> Vec<IntegrationConnection> {
        self.load_all().into_values().collect()
    }

    pub fn delete(&self, provider: ProviderKind) -> bool {
        let mut connections = self.load_all();
        if connections.remove(&provider).is_none() {
            return false;
        }
        self.persist_all(&connections)
    }

    pub fn clear(&self) -> bool {
        self.store.delete(CONNECTIONS_KEY)
    }
}
