use async_trait::async_trait;
use ethers::{abi::Token, types::Address};
use tracing::{info, warn};

use crate::{
    artifacts::Artifacts,
    config::{is_development_chain, network_config, NetworkSettings},
    deployer::{DeployEnvironment, DeployOptions},
    deployments::{DeploymentRecord, DeploymentStore},
    error::DeployError,
    verify::{verify, EtherscanVerifier, VerificationOutcome, VerificationRequest},
};

use super::{deploy_mocks::MOCK_V3_AGGREGATOR, DeployScript};

pub const FUND_ME: &str = "FundMe";

/// Deploys FundMe against the chain's ETH/USD price feed.
pub struct DeployFundMe;

/// The mock's address on development chains, the configured feed otherwise.
pub fn resolve_price_feed(
    network: &NetworkSettings,
    deployments: &DeploymentStore,
) -> Result<Address, DeployError> {
    if is_development_chain(&network.name) {
        return deployments
            .get(MOCK_V3_AGGREGATOR)
            .map(|mock| mock.address)
            .ok_or_else(|| DeployError::DeploymentNotFound(MOCK_V3_AGGREGATOR.to_owned()));
    }

    let feed = network_config(network.chain_id)
        .and_then(|entry| entry.eth_usd_price_feed)
        .ok_or(DeployError::MissingPriceFeed {
            chain_id: network.chain_id,
        })?;

    feed.parse().map_err(|_| {
        DeployError::Config(format!(
            "invalid price feed address '{feed}' for chain {}",
            network.chain_id
        ))
    })
}

/// Verifies `record` when the network has an explorer key, `None` otherwise.
/// Never fails the deployment: a request that can't be built is logged and
/// reported like a rejected verification.
pub async fn verify_deployment(
    network: &NetworkSettings,
    artifacts: &Artifacts,
    name: &str,
    record: &DeploymentRecord,
) -> Option<VerificationOutcome> {
    if !network.should_verify() {
        return None;
    }

    let prepared = VerificationRequest::for_deployment(artifacts, name, record)
        .and_then(|request| Ok((request, EtherscanVerifier::from_network(network)?)));
    let outcome = match prepared {
        Ok((request, verifier)) => verify(&verifier, &request).await,
        Err(e) => {
            warn!("verification of {name} failed: {e}");
            VerificationOutcome::Failed(e.to_string())
        }
    };
    Some(outcome)
}

#[async_trait]
impl DeployScript for DeployFundMe {
    fn id(&self) -> &'static str {
        "01-deploy-fund-me"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["all", "fundme"]
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["mocks"]
    }

    async fn run(&self, env: &mut DeployEnvironment) -> Result<(), DeployError> {
        let eth_usd_price_feed = resolve_price_feed(&env.network, env.deployments())?;

        let args = vec![Token::Address(eth_usd_price_feed)];
        let wait_confirmations = env.network.wait_confirmations();
        let fund_me = env
            .deploy(
                FUND_ME,
                DeployOptions {
                    args,
                    wait_confirmations,
                    ..Default::default()
                },
            )
            .await?;

        verify_deployment(&env.network, env.artifacts(), FUND_ME, &fund_me).await;

        info!("---------------------------");
        Ok(())
    }
}
