//! `siteforge deploy` - publish a sandbox's file set to a provider.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use siteforge_deploy::Dispatcher;
use siteforge_sandbox::{HttpSandboxClient, SandboxOrchestrator};
use siteforge_store::ProviderKind;

#[derive(Args)]
pub struct DeployArgs {
    /// Provider: github, vercel or supabase
    pub provider: ProviderKind,

    /// Sandbox session to extract the files from
    #[arg(long)]
    pub session: String,

    /// Project name at the provider
    #[arg(long)]
    pub name: String,
}

pub async fn execute(args: DeployArgs, data_dir: &Path) -> Result<()> {
    let client = HttpSandboxClient::from_env()?;
    let orchestrator = SandboxOrchestrator::new(Arc::new(client));
    let files = orchestrator.extract_files(&args.session).await?;
    println!("Publishing {} files to {}...", files.len(), args.provider);

    let connections = super::connection_store(data_dir);
    let dispatcher = Dispatcher::with_default_providers();
    let outcome = dispatcher
        .publish(args.provider, &files, &args.name, &connections)
        .await;

    if let Some(url) = &outcome.url {
        println!("Published: {}", url);
    }
    if let Some(repo_url) = &outcome.repo_url {
        println!("Repository: {}", repo_url);
    }
    if outcome.attempted > 0 {
        println!(
            "Files: {}/{} published, {} failed",
            outcome.succeeded, outcome.attempted, outcome.failed
        );
    }

    if !outcome.success {
        bail!(
            "publish to {} failed: {}",
            args.provider,
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
