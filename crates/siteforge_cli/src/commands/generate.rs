//! `siteforge generate` - generate a plan with the text model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use siteforge_analyze::HttpAnalyzer;
use siteforge_llm::{prompt::generation_prompt, GeminiClient, Message, TextModel};
use siteforge_plan::{parse_plan, resolve_actions};

#[derive(Args)]
pub struct GenerateArgs {
    /// What to build
    pub prompt: String,

    /// Merge with this stored project and reuse its design context
    #[arg(long)]
    pub project: Option<String>,

    /// Write the resolved plan to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub async fn execute(args: GenerateArgs, data_dir: &Path) -> Result<()> {
    let store = super::project_store(data_dir);

    let design_context = args
        .project
        .as_deref()
        .and_then(|name| store.get_analysis(name));
    if design_context.is_some() {
        println!("Using cached design context");
    }

    let prompt = generation_prompt(&args.prompt, design_context.as_ref());
    let client = GeminiClient::from_env()?;
    println!("Generating with {}...", client.model());
    let raw = client.complete(&[Message::user(prompt)]).await?;

    let plan = parse_plan(&raw)?;
    let resolved = resolve_actions(plan, &HttpAnalyzer::new()).await?;

    let final_plan = match args.project.as_deref() {
        Some(name) => store.combine(name, resolved.plan),
        None => resolved.plan,
    };

    println!("Plan: {} files, {} deletions", final_plan.files.len(), final_plan.delete.len());
    for path in final_plan.files.keys() {
        println!("  {}", path);
    }

    if let Some(name) = args.project.as_deref() {
        let analysis = resolved
            .design_context
            .clone()
            .or_else(|| store.get_analysis(name));
        let saved = store.save(
            name,
            final_plan.files.clone(),
            Some(final_plan.dependencies.clone()),
            Some(final_plan.dev_dependencies.clone()),
            analysis,
        );
        if !saved {
            println!("Warning: could not save project '{}'", name);
        }
    }

    let serialized = serde_json::to_string_pretty(&final_plan)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, serialized)
                .with_context(|| format!("writing plan to {}", path.display()))?;
            println!("Plan written to {}", path.display());
        }
        None => println!("{}", serialized),
    }

    Ok(())
}
