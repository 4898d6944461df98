//! Supabase publishing adapter.
//!
//! Supabase has no file-set surface; publishing provisions a free-plan
//! project under the account's first organization and reports its URL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use siteforge_store::{IntegrationConnection, ProviderKind};

use crate::error::{DeployError, DeployResult};
use crate::publisher::{AccountInfo, PublishedLocation, Publisher};

const API_BASE: &str = "https://api.supabase.com";
const DEFAULT_REGION: &str = "us-east-1";

pub struct SupabasePublisher {
    client: reqwest::Client,
}

impl Default for SupabasePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SupabasePublisher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct Organization {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct CreatedProject {
    id: String,
    name: String,
}

#[async_trait]
impl Publisher for SupabasePublisher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Supabase
    }

    async fn verify_token(&self, token: &str) -> DeployResult<AccountInfo> {
        let response = self
            .client
            .get(format!("{}/v1/organizations", API_BASE))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeployError::InvalidCredential(format!(
                "Supabase returned {}",
                response.status()
            )));
        }

        let organizations: Vec<Organization> = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        let first = organizations
            .into_iter()
            .next()
            .ok_or_else(|| DeployError::InvalidCredential("no organizations found".to_string()))?;

        Ok(AccountInfo {
            account_id: first.id,
            display_name: first.name,
            email: None,
        })
    }

    async fn publish(
        &self,
        _files: &BTreeMap<String, String>,
        project_name: &str,
        connection: &IntegrationConnection,
    ) -> DeployResult<PublishedLocation> {
        let response = self
            .client
            .post(format!("{}/v1/projects", API_BASE))
            .bearer_auth(&connection.token)
            .json(&json!({
                "name": project_name,
                "organization_id": connection.account_id,
                "plan": "free",
                "region": DEFAULT_REGION,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Publish(format!(
                "project creation failed ({}): {}",
                status, body
            )));
        }

        let project: CreatedProject = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        let url = format!("https://{}.supabase.co", project.id);
        info!("Provisioned Supabase project {} at {}", project.name, url);

        Ok(PublishedLocation {
            url: Some(url),
            repo_url: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
        })
    }
}
