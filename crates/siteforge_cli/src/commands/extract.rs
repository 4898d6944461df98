//! `siteforge extract` - pull the file set out of a sandbox session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use siteforge_sandbox::{HttpSandboxClient, SandboxOrchestrator};

#[derive(Args)]
pub struct ExtractArgs {
    /// Sandbox session id
    pub session_id: String,

    /// Write the files into this directory instead of listing them
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: ExtractArgs) -> Result<()> {
    let client = HttpSandboxClient::from_env()?;
    let orchestrator = SandboxOrchestrator::new(Arc::new(client));

    let files = orchestrator.extract_files(&args.session_id).await?;
    println!("Extracted {} files", files.len());

    match args.out {
        Some(dir) => {
            for (path, content) in &files {
                let target = dir.join(path);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                std::fs::write(&target, content)
                    .with_context(|| format!("writing {}", target.display()))?;
            }
            println!("Written to {}", dir.display());
        }
        None => {
            for (path, content) in &files {
                println!("  {} ({} bytes)", path, content.len());
            }
        }
    }

    Ok(())
}
