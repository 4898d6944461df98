//! CLI command definitions.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use siteforge_store::{ConnectionStore, JsonFileStore, ProjectStore};

pub mod analyze;
pub mod apply;
pub mod connect;
pub mod deploy;
pub mod extract;
pub mod generate;
pub mod projects;
pub mod status;

#[derive(Parser)]
#[command(
    name = "siteforge",
    version,
    about = "Clone a website's design, generate a project with a text model, and run it in a remote sandbox"
)]
pub struct Cli {
    /// Directory holding local siteforge state
    #[arg(long, global = true, env = "SITEFORGE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a website and optionally cache the result into a project
    Analyze(analyze::AnalyzeArgs),
    /// Generate a plan from a prompt with the text model
    Generate(generate::GenerateArgs),
    /// Apply a plan to a sandbox and start the preview server
    Apply(apply::ApplyArgs),
    /// Check whether a sandbox session is still reachable
    Status(status::StatusArgs),
    /// Extract the file set from a sandbox session
    Extract(extract::ExtractArgs),
    /// Verify a provider token and save the connection
    Connect(connect::ConnectArgs),
    /// Publish an extracted file set to a provider
    Deploy(deploy::DeployArgs),
    /// Manage stored projects
    Projects(projects::ProjectsArgs),
}

/// Resolve the local state directory.
pub fn data_dir(cli_override: Option<PathBuf>) -> PathBuf {
    cli_override.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("siteforge")
    })
}

pub fn project_store(data_dir: &std::path::Path) -> ProjectStore {
    ProjectStore::new(Arc::new(JsonFileStore::new(data_dir)))
}

pub fn connection_store(data_dir: &std::path::Path) -> ConnectionStore {
    ConnectionStore::new(Arc::new(JsonFileStore::new(data_dir)))
}
