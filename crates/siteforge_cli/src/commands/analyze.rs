//! `siteforge analyze` - analyze a website.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use siteforge_analyze::{HttpAnalyzer, SiteAnalyzer};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// URL of the site to analyze
    pub url: String,

    /// Cache the analysis into this stored project as design context
    #[arg(long)]
    pub project: Option<String>,
}

pub async fn execute(args: AnalyzeArgs, data_dir: &Path) -> Result<()> {
    let analyzer = HttpAnalyzer::new();
    let analysis = analyzer.analyze(&args.url).await?;

    println!("Analyzed: {}", analysis.base_url);
    println!("  title:       {}", analysis.title);
    if !analysis.description.is_empty() {
        println!("  description: {}", analysis.description);
    }
    println!("  html:        {} chars", analysis.full_html.len());
    println!("  css:         {} chars", analysis.full_css.len());
    println!("  js:          {} chars", analysis.full_js.len());
    println!("  classes:     {}", analysis.used_classes.len());
    if !analysis.tech_guesses.is_empty() {
        println!("  tech:        {}", analysis.tech_guesses.join(", "));
    }
    for file in &analysis.animation_files {
        if let Some(library) = &file.library {
            println!(
                "  animation:   {} ({}% confidence) {}",
                library, file.confidence, file.url
            );
        }
    }

    if let Some(name) = args.project {
        let store = super::project_store(data_dir);
        // Keep any previously generated file set, only refresh the context.
        let existing = store.get(&name);
        let (files, deps, dev_deps) = existing
            .map(|p| {
                (
                    p.file_map(),
                    Some(p.dependencies),
                    Some(p.dev_dependencies),
                )
            })
            .unwrap_or_default();

        if store.save(&name, files, deps, dev_deps, Some(analysis)) {
            println!("Cached analysis into project '{}'", name);
        } else {
            println!("Warning: could not cache analysis into project '{}'", name);
        }
    }

    Ok(())
}
