//! # siteforge_sandbox
//!
//! Drives a remote ephemeral execution environment through a strict state
//! sequence: create/reconnect, write manifest and files, install, build,
//! start, expose. The environment itself is a black-box collaborator
//! behind [`SandboxClient`]; a capturing [`MockSandbox`] makes the whole
//! lifecycle testable without it.

pub mod baseline;
pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod orchestrator;
pub mod session;

pub use client::{CommandOutput, SandboxClient};
pub use error::{SandboxError, SandboxResult};
pub use http::HttpSandboxClient;
pub use mock::{CapturedCall, MockSandbox};
pub use orchestrator::{EncodedFile, SandboxOrchestrator};
pub use session::{SandboxSession, SessionHealth, SessionStatus};
