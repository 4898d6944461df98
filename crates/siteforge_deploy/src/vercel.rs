//! Vercel publishing adapter: one deployment request with inline file
//! blobs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use siteforge_store::{IntegrationConnection, ProviderKind};

use crate::error::{DeployError, DeployResult};
use crate::publisher::{AccountInfo, PublishedLocation, Publisher};

const API_BASE: &str = "https://api.vercel.com";

pub struct VercelPublisher {
    client: reqwest::Client,
}

impl Default for VercelPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl VercelPublisher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct VercelUserEnvelope {
    user: VercelUser,
}

#[derive(Deserialize)]
struct VercelUser {
    id: String,
    username: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct CreatedDeployment {
    url: String,
}

#[async_trait]
impl Publisher for VercelPublisher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vercel
    }

    async fn verify_token(&self, token: &str) -> DeployResult<AccountInfo> {
        let response = self
            .client
            .get(format!("{}/v2/user", API_BASE))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeployError::InvalidCredential(format!(
                "Vercel returned {}",
                response.status()
            )));
        }

        let envelope: VercelUserEnvelope = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        Ok(AccountInfo {
            account_id: envelope.user.id,
            display_name: envelope.user.username,
            email: envelope.user.email,
        })
    }

    async fn publish(
        &self,
        files: &BTreeMap<String, String>,
        project_name: &str,
        connection: &IntegrationConnection,
    ) -> DeployResult<PublishedLocation> {
        let payload_files: Vec<serde_json::Value> = files
            .iter()
            .map(|(path, content)| json!({ "file": path, "data": content }))
            .collect();

        let response = self
            .client
            .post(format!("{}/v13/deployments", API_BASE))
            .bearer_auth(&connection.token)
            .json(&json!({
                "name": project_name,
                "files": payload_files,
                "target": "production",
                "projectSettings": { "framework": "nextjs" },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Publish(format!(
                "deployment failed ({}): {}",
                status, body
            )));
        }

        let deployment: CreatedDeployment = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;

        let url = if deployment.url.starts_with("http") {
            deployment.url
        } else {
            format!("https://{}", deployment.url)
        };
        info!("Deployed {} to {}", project_name, url);

        Ok(PublishedLocation {
            url: Some(url),
            repo_url: None,
            attempted: files.len(),
            succeeded: files.len(),
            failed: 0,
        })
    }
}
