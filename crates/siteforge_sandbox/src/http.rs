//! HTTP binding of the sandbox contract.
//!
//! Talks to an execution-provider gateway exposing the session operations
//! as a small REST surface. The provider's internals stay a black box;
//! per-command timeouts are passed through and enforced remotely, the
//! client only bounds the connect probe so status checks stay prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{CommandOutput, SandboxClient};
use crate::error::{SandboxError, SandboxResult};

/// Environment variable carrying the gateway's API key.
pub const API_KEY_ENV: &str = "E2B_API_KEY";

pub struct HttpSandboxClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpSandboxClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the environment; the endpoint comes from
    /// `SITEFORGE_SANDBOX_URL` and the key from `E2B_API_KEY`.
    pub fn from_env() -> SandboxResult<Self> {
        let base_url = std::env::var("SITEFORGE_SANDBOX_URL")
            .map_err(|_| SandboxError::InvalidResponse("SITEFORGE_SANDBOX_URL not set".into()))?;
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| SandboxError::InvalidResponse(format!("{} not set", API_KEY_ENV)))?;
        Ok(Self::new(base_url, api_key))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.api_key)
    }

    async fn expect_success(
        response: reqwest::Response,
        context: &str,
    ) -> SandboxResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 || status.as_u16() == 410 {
            return Err(SandboxError::SessionUnavailable(format!(
                "{}: {}",
                context, body
            )));
        }
        Err(SandboxError::InvalidResponse(format!(
            "{} returned {}: {}",
            context, status, body
        )))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    session_id: String,
}

#[derive(Deserialize)]
struct ExposedHost {
    url: String,
}

#[derive(Deserialize)]
struct FileListing {
    paths: Vec<String>,
}

#[async_trait]
impl SandboxClient for HttpSandboxClient {
    async fn create(&self, timeout: Duration, auto_pause: bool) -> SandboxResult<String> {
        let response = self
            .post("/v1/sessions")
            .json(&json!({
                "timeoutMs": timeout.as_millis() as u64,
                "autoPause": auto_pause,
            }))
            .send()
            .await?;
        let created: CreatedSession = Self::expect_success(response, "create session")
            .await?
            .json()
            .await
            .map_err(|e| SandboxError::InvalidResponse(e.to_string()))?;
        debug!("Created sandbox session {}", created.session_id);
        Ok(created.session_id)
    }

    async fn connect(&self, session_id: &str, timeout: Duration) -> SandboxResult<()> {
        let response = self
            .post(&format!("/v1/sessions/{}/connect", session_id))
            .json(&json!({ "timeoutMs": timeout.as_millis() as u64 }))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SandboxError::SessionUnavailable(format!("connect timed out: {}", e))
                } else {
                    SandboxError::Http(e)
                }
            })?;
        Self::expect_success(response, "connect session").await?;
        Ok(())
    }

    async fn set_timeout(&self, session_id: &str, timeout: Duration) -> SandboxResult<()> {
        let response = self
            .post(&format!("/v1/sessions/{}/timeout", session_id))
            .json(&json!({ "timeoutMs": timeout.as_millis() as u64 }))
            .send()
            .await?;
        Self::expect_success(response, "refresh timeout").await?;
        Ok(())
    }

    async fn write_file(&self, session_id: &str, path: &str, content: &str) -> SandboxResult<()> {
        let response = self
            .post(&format!("/v1/sessions/{}/files", session_id))
            .json(&json!({ "path": path, "content": content }))
            .send()
            .await?;
        Self::expect_success(response, "write file")
            .await
            .map_err(|e| SandboxError::file(path, e.to_string()))?;
        Ok(())
    }

    async fn delete_file(&self, session_id: &str, path: &str) -> SandboxResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/sessions/{}/files", session_id)))
            .bearer_auth(&self.api_key)
            .json(&json!({ "path": path }))
            .send()
            .await?;
        Self::expect_success(response, "delete file")
            .await
            .map_err(|e| SandboxError::file(path, e.to_string()))?;
        Ok(())
    }

    async fn run_command(
        &self,
        session_id: &str,
        cmd: &str,
        cwd: &str,
        timeout: Duration,
    ) -> SandboxResult<CommandOutput> {
        let response = self
            .post(&format!("/v1/sessions/{}/commands", session_id))
            .json(&json!({
                "cmd": cmd,
                "cwd": cwd,
                "timeoutMs": timeout.as_millis() as u64,
            }))
            .send()
            .await?;
        Self::expect_success(response, "run command")
            .await?
            .json()
            .await
            .map_err(|e| SandboxError::InvalidResponse(e.to_string()))
    }

    async fn start_command(&self, session_id: &str, cmd: &str, cwd: &str) -> SandboxResult<()> {
        let response = self
            .post(&format!("/v1/sessions/{}/commands/background", session_id))
            .json(&json!({ "cmd": cmd, "cwd": cwd }))
            .send()
            .await?;
        Self::expect_success(response, "start command").await?;
        Ok(())
    }

    async fn exposed_url(&self, session_id: &str, port: u16) -> SandboxResult<String> {
        let response = self
            .get(&format!("/v1/sessions/{}/host?port={}", session_id, port))
            .send()
            .await?;
        let host: ExposedHost = Self::expect_success(response, "resolve host")
            .await?
            .json()
            .await
            .map_err(|e| SandboxError::InvalidResponse(e.to_string()))?;
        Ok(host.url)
    }

    async fn list_files(&self, session_id: &str, cwd: &str) -> SandboxResult<Vec<String>> {
        let response = self
            .get(&format!("/v1/sessions/{}/files?cwd={}", session_id, cwd))
            .send()
            .await?;
        let listing: FileListing = Self::expect_success(response, "list files")
            .await?
            .json()
            .await
            .map_err(|e| SandboxError::InvalidResponse(e.to_string()))?;
        Ok(listing.paths)
    }

    async fn read_file(&self, session_id: &str, path: &str) -> SandboxResult<String> {
        let response = self
            .get(&format!(
                "/v1/sessions/{}/files/content?path={}",
                session_id, path
            ))
            .send()
            .await?;
        Self::expect_success(response, "read file")
            .await
            .map_err(|e| SandboxError::file(path, e.to_string()))?
            .text()
            .await
            .map_err(|e| SandboxError::file(path, e.to_string()))
    }
}
