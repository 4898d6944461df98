//! siteforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Analysis failure
//! - 4: Generation/plan failure
//! - 5: Sandbox failure
//! - 6: Deployment failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const ANALYSIS_ERROR: u8 = 3;
    pub const GENERATION_ERROR: u8 = 4;
    pub const SANDBOX_ERROR: u8 = 5;
    pub const DEPLOY_ERROR: u8 = 6;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("siteforge=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();
    let data_dir = commands::data_dir(cli.data_dir);

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, &data_dir).await,
        Commands::Generate(args) => commands::generate::execute(args, &data_dir).await,
        Commands::Apply(args) => commands::apply::execute(args, &data_dir).await,
        Commands::Status(args) => commands::status::execute(args).await,
        Commands::Extract(args) => commands::extract::execute(args).await,
        Commands::Connect(args) => commands::connect::execute(args, &data_dir).await,
        Commands::Deploy(args) => commands::deploy::execute(args, &data_dir).await,
        Commands::Projects(args) => commands::projects::execute(args, &data_dir),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<siteforge_analyze::AnalyzeError>().is_some() {
        ExitCodes::ANALYSIS_ERROR
    } else if e.downcast_ref::<siteforge_plan::PlanError>().is_some()
        || e.downcast_ref::<siteforge_llm::LlmError>().is_some()
    {
        ExitCodes::GENERATION_ERROR
    } else if e.downcast_ref::<siteforge_sandbox::SandboxError>().is_some() {
        ExitCodes::SANDBOX_ERROR
    } else if e.downcast_ref::<siteforge_deploy::DeployError>().is_some() {
        ExitCodes::DEPLOY_ERROR
    } else if e.to_string().to_lowercase().contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
