mod cli;
mod commands;

use clap::Parser;
use fund_me::{config::NetworkSettings, deployer::DeployEnvironment};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let Cli { network, command } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = NetworkSettings::load(&network)?;
    let mut env = DeployEnvironment::connect(settings).await?;

    command.run(&mut env).await?;
    Ok(())
}
