//! GitHub publishing adapter: repository creation plus per-file uploads
//! through the contents API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use siteforge_store::{IntegrationConnection, ProviderKind};

use crate::error::{DeployError, DeployResult};
use crate::publisher::{AccountInfo, PublishedLocation, Publisher};

const API_BASE: &str = "https://api.github.com";
const APP_USER_AGENT: &str = "siteforge";

pub struct GitHubPublisher {
    client: reqwest::Client,
}

impl Default for GitHubPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubPublisher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct CreatedRepo {
    html_url: String,
    full_name: String,
}

#[async_trait]
impl Publisher for GitHubPublisher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    async fn verify_token(&self, token: &str) -> DeployResult<AccountInfo> {
        let response = self
            .client
            .get(format!("{}/user", API_BASE))
            .bearer_auth(token)
            .header("User-Agent", APP_USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeployError::InvalidCredential(format!(
                "GitHub returned {}",
                response.status()
            )));
        }

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        Ok(AccountInfo {
            account_id: user.id.to_string(),
            display_name: user.login,
            email: user.email,
        })
    }

    async fn publish(
        &self,
        files: &BTreeMap<String, String>,
        project_name: &str,
        connection: &IntegrationConnection,
    ) -> DeployResult<PublishedLocation> {
        let response = self
            .client
            .post(format!("{}/user/repos", API_BASE))
            .bearer_auth(&connection.token)
            .header("User-Agent", APP_USER_AGENT)
            .json(&json!({
                "name": project_name,
                "private": false,
                "description": "Generated with siteforge",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Publish(format!(
                "repository creation failed ({}): {}",
                status, body
            )));
        }

        let repo: CreatedRepo = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        info!("Created repository {}", repo.full_name);

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for (path, content) in files {
            let upload = self
                .client
                .put(format!(
                    "{}/repos/{}/contents/{}",
                    API_BASE, repo.full_name, path
                ))
                .bearer_auth(&connection.token)
                .header("User-Agent", APP_USER_AGENT)
                .json(&json!({
                    "message": format!("Add {}", path),
                    "content": BASE64.encode(content.as_bytes()),
                }))
                .send()
                .await;

            match upload {
                Ok(response) if response.status().is_success() => succeeded += 1,
                Ok(response) => {
                    warn!("Upload of {} failed: {}", path, response.status());
                    failed += 1;
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", path, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Pushed {}/{} files to {}",
            succeeded,
            files.len(),
            repo.full_name
        );
        Ok(PublishedLocation {
            url: None,
            repo_url: Some(repo.html_url),
            attempted: files.len(),
            succeeded,
            failed,
        })
    }
}
