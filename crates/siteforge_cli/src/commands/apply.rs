//! `siteforge apply` - drive a plan through the sandbox lifecycle.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use siteforge_analyze::HttpAnalyzer;
use siteforge_plan::{parse_plan, resolve_actions};
use siteforge_sandbox::{HttpSandboxClient, SandboxOrchestrator};

#[derive(Args)]
pub struct ApplyArgs {
    /// Plan file (raw model output is accepted too); stdin when omitted
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Reconnect to an existing sandbox session instead of creating one
    #[arg(long)]
    pub session: Option<String>,

    /// Merge with this stored project before applying, and save the result
    #[arg(long)]
    pub project: Option<String>,
}

pub async fn execute(args: ApplyArgs, data_dir: &Path) -> Result<()> {
    let raw = match &args.plan {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading plan from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading plan from stdin")?;
            buffer
        }
    };

    let plan = parse_plan(&raw)?;
    let resolved = resolve_actions(plan, &HttpAnalyzer::new()).await?;

    let store = super::project_store(data_dir);
    let final_plan = match args.project.as_deref() {
        Some(name) => store.combine(name, resolved.plan),
        None => resolved.plan,
    };

    let client = HttpSandboxClient::from_env()?;
    let orchestrator = SandboxOrchestrator::new(Arc::new(client));
    let session = orchestrator
        .apply_plan(&final_plan, args.session.as_deref())
        .await?;

    println!("Session:  {}", session.session_id);
    if let Some(url) = &session.live_url {
        println!("Preview:  {}", url);
    }

    if let Some(name) = args.project.as_deref() {
        let analysis = resolved
            .design_context
            .clone()
            .or_else(|| store.get_analysis(name));
        if !store.save(
            name,
            final_plan.files.clone(),
            Some(final_plan.dependencies.clone()),
            Some(final_plan.dev_dependencies.clone()),
            analysis,
        ) {
            println!("Warning: could not save project '{}'", name);
        }
    }

    Ok(())
}
