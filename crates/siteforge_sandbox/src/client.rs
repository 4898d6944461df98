//! Remote execution environment contract.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SandboxResult;

/// Output of a blocking remote command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn combined(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Operations the remote execution environment exposes.
///
/// `connect` must fail with `SessionUnavailable` when the session has
/// expired or paused beyond recovery; `delete_file` failures are expected
/// to be treated as non-fatal by callers.
#[async_trait]
pub trait SandboxClient: Send + Sync {
    /// Create a fresh session and return its opaque id.
    async fn create(&self, timeout: Duration, auto_pause: bool) -> SandboxResult<String>;

    /// Reconnect to an existing session.
    async fn connect(&self, session_id: &str, timeout: Duration) -> SandboxResult<()>;

    /// Refresh the session's idle expiry.
    async fn set_timeout(&self, session_id: &str, timeout: Duration) -> SandboxResult<()>;

    async fn write_file(&self, session_id: &str, path: &str, content: &str) -> SandboxResult<()>;

    async fn delete_file(&self, session_id: &str, path: &str) -> SandboxResult<()>;

    /// Run a command to completion. The timeout is enforced by the
    /// provider, not the client.
    async fn run_command(
        &self,
        session_id: &str,
        cmd: &str,
        cwd: &str,
        timeout: Duration,
    ) -> SandboxResult<CommandOutput>;

    /// Start a long-running process without waiting for it.
    async fn start_command(&self, session_id: &str, cmd: &str, cwd: &str) -> SandboxResult<()>;

    /// Externally reachable URL for a port inside the session.
    async fn exposed_url(&self, session_id: &str, port: u16) -> SandboxResult<String>;

    /// All tracked file paths under `cwd`, relative to it.
    async fn list_files(&self, session_id: &str, cwd: &str) -> SandboxResult<Vec<String>>;

    async fn read_file(&self, session_id: &str, path: &str) -> SandboxResult<String>;
}
