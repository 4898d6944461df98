//! Mock sandbox for testing.
//!
//! Captures every call, keeps an in-memory file tree per session, and
//! supports scripted failures, so the full lifecycle can be exercised
//! without a real execution environment.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::client::{CommandOutput, SandboxClient};
use crate::error::{SandboxError, SandboxResult};

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub session_id: String,
    /// Path, command or other call-specific argument
    pub detail: String,
}

#[derive(Debug, Default, Clone)]
struct MockSession {
    files: BTreeMap<String, String>,
    started_commands: Vec<String>,
    timeout: Option<Duration>,
    auto_pause: bool,
}

#[derive(Default)]
struct MockState {
    sessions: HashMap<String, MockSession>,
    next_id: usize,
    calls: Vec<CapturedCall>,
    unreachable: HashSet<String>,
    failing_writes: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_command_markers: Vec<String>,
}

/// Configurable capturing mock of the sandbox collaborator.
#[derive(Clone, Default)]
pub struct MockSandbox {
    state: Arc<RwLock<MockState>>,
}

impl MockSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a session id fail every connect attempt.
    pub fn make_unreachable(&self, session_id: impl Into<String>) {
        self.state.write().unreachable.insert(session_id.into());
    }

    /// Fail writes whose absolute path ends with `suffix`.
    pub fn fail_write(&self, suffix: impl Into<String>) {
        self.state.write().failing_writes.insert(suffix.into());
    }

    /// Fail deletes whose absolute path ends with `suffix`.
    pub fn fail_delete(&self, suffix: impl Into<String>) {
        self.state.write().failing_deletes.insert(suffix.into());
    }

    /// Fail commands containing `marker`.
    pub fn fail_command_containing(&self, marker: impl Into<String>) {
        self.state
            .write()
            .failing_command_markers
            .push(marker.into());
    }

    /// Place a file into a session's tree directly, creating the session
    /// if needed.
    pub fn seed_file(
        &self,
        session_id: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) {
        let mut state = self.state.write();
        state
            .sessions
            .entry(session_id.into())
            .or_default()
            .files
            .insert(path.into(), content.into());
    }

    /// Snapshot of a session's file tree, keyed by absolute path.
    pub fn files(&self, session_id: &str) -> BTreeMap<String, String> {
        self.state
            .read()
            .sessions
            .get(session_id)
            .map(|s| s.files.clone())
            .unwrap_or_default()
    }

    pub fn started_commands(&self, session_id: &str) -> Vec<String> {
        self.state
            .read()
            .sessions
            .get(session_id)
            .map(|s| s.started_commands.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.state.read().calls.clone()
    }

    pub fn method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.state
            .read()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn capture(&self, method: &str, session_id: &str, detail: impl Into<String>) {
        self.state.write().calls.push(CapturedCall {
            method: method.to_string(),
            session_id: session_id.to_string(),
            detail: detail.into(),
        });
    }

    fn ensure_session(&self, session_id: &str) -> SandboxResult<()> {
        let state = self.state.read();
        if state.unreachable.contains(session_id) || !state.sessions.contains_key(session_id) {
            return Err(SandboxError::SessionUnavailable(session_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SandboxClient for MockSandbox {
    async fn create(&self, timeout: Duration, auto_pause: bool) -> SandboxResult<String> {
        let mut state = self.state.write();
        state.next_id += 1;
        let session_id = format!("sbx-{}", state.next_id);
        state.sessions.insert(
            session_id.clone(),
            MockSession {
                timeout: Some(timeout),
                auto_pause,
                ..MockSession::default()
            },
        );
        state.calls.push(CapturedCall {
            method: "create".to_string(),
            session_id: session_id.clone(),
            detail: format!("timeout={}s auto_pause={}", timeout.as_secs(), auto_pause),
        });
        Ok(session_id)
    }

    async fn connect(&self, session_id: &str, timeout: Duration) -> SandboxResult<()> {
        self.capture("connect", session_id, format!("timeout={}s", timeout.as_secs()));
        self.ensure_session(session_id)
    }

    async fn set_timeout(&self, session_id: &str, timeout: Duration) -> SandboxResult<()> {
        self.capture(
            "set_timeout",
            session_id,
            format!("timeout={}s", timeout.as_secs()),
        );
        self.ensure_session(session_id)?;
        if let Some(session) = self.state.write().sessions.get_mut(session_id) {
            session.timeout = Some(timeout);
        }
        Ok(())
    }

    async fn write_file(&self, session_id: &str, path: &str, content: &str) -> SandboxResult<()> {
        self.capture("write_file", session_id, path);
        self.ensure_session(session_id)?;

        let mut state = self.state.write();
        if state.failing_writes.iter().any(|s| path.ends_with(s.as_str())) {
            return Err(SandboxError::file(path, "scripted write failure"));
        }
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.files.insert(path.to_string(), content.to_string());
        }
        Ok(())
    }

    async fn delete_file(&self, session_id: &str, path: &str) -> SandboxResult<()> {
        self.capture("delete_file", session_id, path);
        self.ensure_session(session_id)?;

        let mut state = self.state.write();
        if state
            .failing_deletes
            .iter()
            .any(|s| path.ends_with(s.as_str()))
        {
            return Err(SandboxError::file(path, "scripted delete failure"));
        }
        match state
            .sessions
            .get_mut(session_id)
            .and_then(|s| s.files.remove(path))
        {
            Some(_) => Ok(()),
            None => Err(SandboxError::file(path, "no such file")),
        }
    }

    async fn run_command(
        &self,
        session_id: &str,
        cmd: &str,
        _cwd: &str,
        timeout: Duration,
    ) -> SandboxResult<CommandOutput> {
        self.capture(
            "run_command",
            session_id,
            format!("{} timeout={}s", cmd, timeout.as_secs()),
        );
        self.ensure_session(session_id)?;

        let state = self.state.read();
        if state
            .failing_command_markers
            .iter()
            .any(|m| cmd.contains(m.as_str()))
        {
            return Err(SandboxError::Command(format!(
                "scripted failure for '{}'",
                cmd
            )));
        }
        Ok(CommandOutput::default())
    }

    async fn start_command(&self, session_id: &str, cmd: &str, _cwd: &str) -> SandboxResult<()> {
        self.capture("start_command", session_id, cmd);
        self.ensure_session(session_id)?;
        if let Some(session) = self.state.write().sessions.get_mut(session_id) {
            session.started_commands.push(cmd.to_string());
        }
        Ok(())
    }

    async fn exposed_url(&self, session_id: &str, port: u16) -> SandboxResult<String> {
        self.capture("exposed_url", session_id, port.to_string());
        self.ensure_session(session_id)?;
        Ok(format!("https://{}-{}.mock.dev", port, session_id))
    }

    async fn list_files(&self, session_id: &str, cwd: &str) -> SandboxResult<Vec<String>> {
        self.capture("list_files", session_id, cwd);
        self.ensure_session(session_id)?;

        let prefix = format!("{}/", cwd.trim_end_matches('/'));
        Ok(self
            .state
            .read()
            .sessions
            .get(session_id)
            .map(|s| {
                s.files
                    .keys()
                    .filter_map(|path| path.strip_prefix(&prefix))
                    .map(|rel| format!("./{}", rel))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_file(&self, session_id: &str, path: &str) -> SandboxResult<String> {
        self.capture("read_file", session_id, path);
        self.ensure_session(session_id)?;

        self.state
            .read()
            .sessions
            .get(session_id)
            .and_then(|s| s.files.get(path).cloned())
            .ok_or_else(|| SandboxError::file(path, "no such file"))
    }
}
