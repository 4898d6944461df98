//! `siteforge connect` - verify and save a provider connection.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use siteforge_deploy::Dispatcher;
use siteforge_store::ProviderKind;

#[derive(Args)]
pub struct ConnectArgs {
    /// Provider: github, vercel or supabase
    pub provider: ProviderKind,

    /// Access token for the provider
    #[arg(long, env = "SITEFORGE_PROVIDER_TOKEN")]
    pub token: String,
}

pub async fn execute(args: ConnectArgs, data_dir: &Path) -> Result<()> {
    let connections = super::connection_store(data_dir);
    let dispatcher = Dispatcher::with_default_providers();

    let connection = dispatcher
        .authenticate(args.provider, &args.token, &connections)
        .await?;

    println!(
        "Connected {} as {}",
        connection.provider, connection.display_name
    );
    Ok(())
}
