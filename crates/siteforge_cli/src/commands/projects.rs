//! `siteforge projects` - manage stored project snapshots.

use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand)]
pub enum ProjectsCommand {
    /// List stored projects
    List,
    /// Delete one stored project
    Delete {
        /// Project name
        name: String,
    },
    /// Remove every stored project
    Clear,
}

pub fn execute(args: ProjectsArgs, data_dir: &Path) -> Result<()> {
    let store = super::project_store(data_dir);

    match args.command {
        ProjectsCommand::List => {
            let projects = store.list();
            if projects.is_empty() {
                println!("No stored projects");
                return Ok(());
            }
            for project in projects {
                println!(
                    "{}  ({} files, saved {})",
                    project.name,
                    project.files.len(),
                    project.saved_at.format("%Y-%m-%d %H:%M UTC")
                );
                if let Some(analysis) = &project.analysis {
                    println!("    design context: {}", analysis.base_url);
                }
            }
        }
        ProjectsCommand::Delete { name } => {
            if !store.delete(&name) {
                bail!("no stored project named '{}'", name);
            }
            println!("Deleted '{}'", name);
        }
        ProjectsCommand::Clear => {
            if !store.clear() {
                bail!("could not clear the project store");
            }
            println!("Project store cleared");
        }
    }

    Ok(())
}
