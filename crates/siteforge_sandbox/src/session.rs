//! Sandbox session state machine.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lifecycle states of a remote session.
///
/// Transitions are monotonic forward; `Error` is reachable from any state
/// and `Expired` from `Created` onward. The only recovery from either is a
/// new session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Created,
    FilesWritten,
    Installed,
    Built,
    Running,
    Error,
    Expired,
}

impl SessionStatus {
    fn ordinal(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Created => 1,
            Self::FilesWritten => 2,
            Self::Installed => 3,
            Self::Built => 4,
            Self::Running => 5,
            Self::Error | Self::Expired => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Expired)
    }

    pub fn can_advance_to(self, next: SessionStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next.is_terminal() {
            return !(next == Self::Expired && self == Self::Uninitialized);
        }
        next.ordinal() > self.ordinal()
    }
}

/// One remote execution context as the orchestrator sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxSession {
    pub session_id: String,
    pub status: SessionStatus,
    /// Present once the session reaches `Running`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
}

impl SandboxSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            status: SessionStatus::Uninitialized,
            live_url: None,
        }
    }

    /// Move the session forward; illegal transitions are logged and
    /// ignored rather than corrupting the state.
    pub fn advance(&mut self, next: SessionStatus) {
        if self.status.can_advance_to(next) {
            debug!(
                "Session {}: {:?} -> {:?}",
                self.session_id, self.status, next
            );
            self.status = next;
        } else {
            warn!(
                "Session {}: refusing transition {:?} -> {:?}",
                self.session_id, self.status, next
            );
        }
    }
}

/// Result of a side-effect-free reachability probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHealth {
    pub session_id: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
