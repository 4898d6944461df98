//! Publishing capability contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use siteforge_store::{IntegrationConnection, ProviderKind};

use crate::error::DeployResult;

/// Account identity returned by a successful token verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Where a publish landed, with per-file counts for multi-file pushes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// One external publishing collaborator.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Round-trip the token against the provider and return the account it
    /// belongs to.
    async fn verify_token(&self, token: &str) -> DeployResult<AccountInfo>;

    /// Push the file set and return the published location.
    async fn publish(
        &self,
        files: &BTreeMap<String, String>,
        project_name: &str,
        connection: &IntegrationConnection,
    ) -> DeployResult<PublishedLocation>;
}
