use std::sync::Arc;

use ethers::providers::Middleware;

use crate::{deployments::DeploymentStore, error::DeployError, scripts::deploy_fund_me::FUND_ME};

// Include generated contract types from build script
include!(concat!(env!("OUT_DIR"), "/fund_me_contract.rs"));

/// Solidity signature of the owner-check custom error.
pub const NOT_OWNER_ERROR: &str = "FundMe__NotOwner()";
/// Revert reason of `fund` below the minimum contribution.
pub const NOT_ENOUGH_ETH_REASON: &str = "You need to spend more ETH!";

/// The recorded FundMe deployment, connected to `client`.
pub fn deployed_fund_me<M: Middleware>(
    deployments: &DeploymentStore,
    client: Arc<M>,
) -> Result<FundMe<M>, DeployError> {
    let record = deployments
        .get(FUND_ME)
        .ok_or_else(|| DeployError::DeploymentNotFound(FUND_ME.to_owned()))?;

    Ok(FundMe::new(record.address, client))
}
