use std::sync::Arc;

use ethers::providers::Middleware;

use crate::{
    deployments::DeploymentStore, error::DeployError,
    scripts::deploy_mocks::MOCK_V3_AGGREGATOR,
};

include!(concat!(env!("OUT_DIR"), "/mock_v3_aggregator_contract.rs"));

pub fn deployed_mock_v3_aggregator<M: Middleware>(
    deployments: &DeploymentStore,
    client: Arc<M>,
) -> Result<MockV3Aggregator<M>, DeployError> {
    let record = deployments
        .get(MOCK_V3_AGGREGATOR)
        .ok_or_else(|| DeployError::DeploymentNotFound(MOCK_V3_AGGREGATOR.to_owned()))?;

    Ok(MockV3Aggregator::new(record.address, client))
}
