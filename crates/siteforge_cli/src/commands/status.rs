//! `siteforge status` - probe a sandbox session.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use siteforge_sandbox::{HttpSandboxClient, SandboxOrchestrator};

#[derive(Args)]
pub struct StatusArgs {
    /// Sandbox session id
    pub session_id: String,
}

pub async fn execute(args: StatusArgs) -> Result<()> {
    let client = HttpSandboxClient::from_env()?;
    let orchestrator = SandboxOrchestrator::new(Arc::new(client));

    let health = orchestrator.check_status(&args.session_id).await;
    if health.active {
        println!("Session {} is active", health.session_id);
    } else {
        println!(
            "Session {} is inactive: {}",
            health.session_id,
            health.error.unwrap_or_else(|| "unreachable".to_string())
        );
        println!("Start a fresh session with `siteforge apply`");
    }

    Ok(())
}
