//! Sandbox lifecycle orchestration.
//!
//! `apply_plan` is the single entry point performing the full sequence:
//! resolve session, write manifest and files, install, build, start. Each
//! step is a blocking remote call and any failure aborts the whole apply
//! with that step's name attached. Re-application against an existing
//! session reconnects instead of recreating and is additive: only
//! `plan.delete` removes files, everything else is left in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use siteforge_plan::Plan;

use crate::baseline::{
    absolute, baseline_manifest, is_tracked, merged_manifest, pretty, APP_PORT, BUILD_COMMAND,
    BUILD_TIMEOUT, DEFAULT_LAYOUT, INSTALL_COMMAND, INSTALL_TIMEOUT, LAYOUT_PATH, MANIFEST_PATH,
    PROJECT_ROOT, SESSION_TIMEOUT, START_COMMAND, STATUS_TIMEOUT,
};
use crate::client::SandboxClient;
use crate::error::{SandboxError, SandboxResult};
use crate::session::{SandboxSession, SessionHealth, SessionStatus};

/// File payload shaped for providers that require encoded envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedFile {
    pub content: String,
    pub encoding: String,
}

/// Drives one remote session at a time through the apply sequence.
pub struct SandboxOrchestrator {
    client: Arc<dyn SandboxClient>,
}

impl SandboxOrchestrator {
    pub fn new(client: Arc<dyn SandboxClient>) -> Self {
        Self { client }
    }

    /// Apply a resolved plan, creating a session or reconnecting to an
    /// existing one, and return the running session with its preview URL.
    pub async fn apply_plan(
        &self,
        plan: &Plan,
        existing_session_id: Option<&str>,
    ) -> SandboxResult<SandboxSession> {
        let session_id = match existing_session_id {
            Some(id) => {
                info!("Reconnecting to sandbox {}", id);
                self.client
                    .connect(id, SESSION_TIMEOUT)
                    .await
                    .map_err(|e| SandboxError::step("reconnect session", e))?;
                self.client
                    .set_timeout(id, SESSION_TIMEOUT)
                    .await
                    .map_err(|e| SandboxError::step("refresh session timeout", e))?;
                id.to_string()
            }
            None => {
                info!("Creating new sandbox session");
                self.client
                    .create(SESSION_TIMEOUT, true)
                    .await
                    .map_err(|e| SandboxError::step("create session", e))?
            }
        };

        let mut session = SandboxSession::new(&session_id);
        session.advance(SessionStatus::Created);

        let manifest = merged_manifest(plan);
        self.client
            .write_file(&session_id, &absolute(MANIFEST_PATH), &manifest)
            .await
            .map_err(|e| SandboxError::step("write manifest", e))?;

        // The scaffold must stay runnable even from an empty plan.
        if !plan.files.contains_key(LAYOUT_PATH) {
            debug!("Plan has no root layout, writing default");
            self.client
                .write_file(&session_id, &absolute(LAYOUT_PATH), DEFAULT_LAYOUT)
                .await
                .map_err(|e| SandboxError::step("write default layout", e))?;
        }

        for path in &plan.delete {
            if let Err(e) = self.client.delete_file(&session_id, &absolute(path)).await {
                warn!("Could not delete {}: {}", path, e);
            }
        }

        for (path, content) in &plan.files {
            debug!("Writing {}", path);
            self.client
                .write_file(&session_id, &absolute(path), content)
                .await
                .map_err(|e| SandboxError::step(format!("write {}", path), e))?;
        }
        session.advance(SessionStatus::FilesWritten);

        info!("Installing dependencies in {}", session_id);
        self.client
            .run_command(&session_id, INSTALL_COMMAND, PROJECT_ROOT, INSTALL_TIMEOUT)
            .await
            .map_err(|e| SandboxError::step("install dependencies", e))?;
        session.advance(SessionStatus::Installed);

        info!("Building project in {}", session_id);
        self.client
            .run_command(&session_id, BUILD_COMMAND, PROJECT_ROOT, BUILD_TIMEOUT)
            .await
            .map_err(|e| SandboxError::step("build project", e))?;
        session.advance(SessionStatus::Built);

        self.client
            .start_command(&session_id, START_COMMAND, PROJECT_ROOT)
            .await
            .map_err(|e| SandboxError::step("start server", e))?;
        let url = self
            .client
            .exposed_url(&session_id, APP_PORT)
            .await
            .map_err(|e| SandboxError::step("resolve preview url", e))?;

        session.advance(SessionStatus::Running);
        session.live_url = Some(url.clone());
        info!("Sandbox {} serving at {}", session_id, url);

        Ok(session)
    }

    /// Reachability probe with a short timeout and no side effects; an
    /// unreachable session reports inactive instead of raising.
    pub async fn check_status(&self, session_id: &str) -> SessionHealth {
        match self.client.connect(session_id, STATUS_TIMEOUT).await {
            Ok(()) => SessionHealth {
                session_id: session_id.to_string(),
                active: true,
                error: None,
            },
            Err(e) => {
                debug!("Status check failed for {}: {}", session_id, e);
                SessionHealth {
                    session_id: session_id.to_string(),
                    active: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Read the project file set out of the session, excluding dependency
    /// and build caches. Structured files are re-serialized pretty-printed;
    /// a corrupt root manifest is replaced with the baseline instead of
    /// propagating the parse error.
    pub async fn extract_files(
        &self,
        session_id: &str,
    ) -> SandboxResult<BTreeMap<String, String>> {
        self.client
            .connect(session_id, SESSION_TIMEOUT)
            .await
            .map_err(|e| SandboxError::step("reconnect session", e))?;
        self.client.set_timeout(session_id, SESSION_TIMEOUT).await?;

        let listed = self.client.list_files(session_id, PROJECT_ROOT).await?;
        let mut files = BTreeMap::new();

        for raw_path in listed {
            let path = raw_path.trim_start_matches("./").to_string();
            if !is_tracked(&path) {
                continue;
            }

            let content = match self.client.read_file(session_id, &absolute(&path)).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Could not read {}: {}", path, e);
                    continue;
                }
            };

            let content = if path.ends_with(".json") {
                normalize_json(&path, content)
            } else {
                content
            };

            files.insert(path, content);
        }

        info!("Extracted {} files from {}", files.len(), session_id);
        Ok(files)
    }

    /// Extract and wrap every file as a base64 envelope for publishing
    /// providers that require encoded payloads.
    pub async fn process_files(
        &self,
        session_id: &str,
    ) -> SandboxResult<BTreeMap<String, EncodedFile>> {
        let files = self.extract_files(session_id).await?;

        if let Some(manifest) = files.get(MANIFEST_PATH) {
            serde_json::from_str::<serde_json::Value>(manifest).map_err(|e| {
                SandboxError::file(MANIFEST_PATH, format!("manifest is not valid JSON: {}", e))
            })?;
        }

        Ok(files
            .into_iter()
            .map(|(path, content)| {
                (
                    path,
                    EncodedFile {
                        content: BASE64.encode(content.as_bytes()),
                        encoding: "base64".to_string(),
                    },
                )
            })
            .collect())
    }
}

/// Pretty-print structured files so downstream consumers see normalized
/// formatting. The root manifest falls back to the baseline when corrupt;
/// other unparsable files are passed through untouched.
fn normalize_json(path: &str, content: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => pretty(&value),
        Err(e) if path == MANIFEST_PATH => {
            warn!("Root manifest is corrupt ({}), using baseline", e);
            pretty(&baseline_manifest())
        }
        Err(e) => {
            warn!("Leaving unparsable JSON file {} as-is: {}", path, e);
            content
        }
    }
}
