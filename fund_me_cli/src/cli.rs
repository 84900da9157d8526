//! Command line arguments of the `fund-me` binary

use clap::{Args, Parser, Subcommand};
use fund_me::{config::DEFAULT_NETWORK, deployer::DeployEnvironment, error::DeployError};

use crate::commands::{deploy, fund, verify, withdraw};

#[derive(Parser)]
#[command(about = "Deploy and operate the FundMe contract")]
pub struct Cli {
    /// Network to run against, `hardhat` and `localhost` are development chains
    #[arg(short, long, global = true, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Deploy(DeployArgs),
    Verify(VerifyArgs),
    Fund(FundArgs),
    Withdraw(WithdrawArgs),
}

impl Command {
    pub async fn run(self, env: &mut DeployEnvironment) -> Result<(), DeployError> {
        match self {
            Command::Deploy(args) => deploy(args, env).await,
            Command::Verify(args) => verify(args, env).await,
            Command::Fund(args) => fund(args, env).await,
            Command::Withdraw(args) => withdraw(args, env).await,
        }
    }
}

/// Run the deploy scripts
#[derive(Args)]
pub struct DeployArgs {
    /// Only run the scripts with these tags (`all`, `mocks`, `fundme`)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Verify a recorded deployment on Etherscan
#[derive(Args)]
pub struct VerifyArgs {
    /// Deployment name, e.g. `FundMe`
    pub deployment: String,
}

/// Fund the deployed FundMe contract from the deployer account
#[derive(Args)]
pub struct FundArgs {
    /// Amount in ether
    #[arg(short, long, default_value = "0.1")]
    pub value: String,
}

/// Withdraw every funded ether to the owner
#[derive(Args)]
pub struct WithdrawArgs {
    /// Use `cheaperWithdraw`
    #[arg(long)]
    pub cheaper: bool,
}
