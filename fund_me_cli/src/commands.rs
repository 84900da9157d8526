//! Implementations of the `fund-me` subcommands

use ethers::{
    providers::Middleware,
    utils::{format_ether, parse_ether},
};
use fund_me::{
    contracts::{describe_contract_error, fund_me::deployed_fund_me},
    deployer::DeployEnvironment,
    error::DeployError,
    verify::{self as verification, EtherscanVerifier, VerificationOutcome, VerificationRequest},
};
use tracing::info;

use crate::cli::{DeployArgs, FundArgs, VerifyArgs, WithdrawArgs};

pub async fn deploy(args: DeployArgs, env: &mut DeployEnvironment) -> Result<(), DeployError> {
    let tags: Vec<&str> = args.tags.iter().map(String::as_str).collect();
    env.run_scripts(&tags).await?;

    for name in env.deployments().names() {
        info!("{name}: {:?}", env.get(name)?.address);
    }
    Ok(())
}

pub async fn verify(args: VerifyArgs, env: &mut DeployEnvironment) -> Result<(), DeployError> {
    let record = env.get(&args.deployment)?;
    let request = VerificationRequest::for_deployment(env.artifacts(), &args.deployment, record)?;
    let verifier = EtherscanVerifier::from_network(&env.network)?;

    match verification::verify(&verifier, &request).await {
        VerificationOutcome::Failed(reason) => Err(DeployError::ContractInteraction(format!(
            "verification of {} failed: {reason}",
            args.deployment
        ))),
        _ => Ok(()),
    }
}

pub async fn fund(args: FundArgs, env: &mut DeployEnvironment) -> Result<(), DeployError> {
    let value = parse_ether(&args.value)
        .map_err(|e| DeployError::Config(format!("invalid amount '{}': {e}", args.value)))?;
    let fund_me = deployed_fund_me(env.deployments(), env.deployer())?;

    info!("Funding contract {:?} with {} ETH...", fund_me.address(), args.value);
    let call = fund_me.fund().value(value);
    let pending = call
        .send()
        .await
        .map_err(|e| DeployError::ContractInteraction(describe_contract_error(&e)))?;
    pending
        .confirmations(env.network.wait_confirmations())
        .await?;
    info!("Funded!");

    log_contract_balance(env, fund_me.address()).await
}

pub async fn withdraw(args: WithdrawArgs, env: &mut DeployEnvironment) -> Result<(), DeployError> {
    let fund_me = deployed_fund_me(env.deployments(), env.deployer())?;

    info!("Withdrawing from {:?}...", fund_me.address());
    let call = if args.cheaper {
        fund_me.cheaper_withdraw()
    } else {
        fund_me.withdraw()
    };
    let pending = call
        .send()
        .await
        .map_err(|e| DeployError::ContractInteraction(describe_contract_error(&e)))?;
    pending
        .confirmations(env.network.wait_confirmations())
        .await?;
    info!("Got it back!");

    log_contract_balance(env, fund_me.address()).await
}

async fn log_contract_balance(
    env: &DeployEnvironment,
    address: ethers::types::Address,
) -> Result<(), DeployError> {
    let balance = env.deployer().provider().get_balance(address, None).await?;
    info!("contract balance: {} ETH", format_ether(balance));
    Ok(())
}
