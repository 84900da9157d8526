use async_trait::async_trait;
use ethers::{abi::Token, types::I256};
use tracing::info;

use crate::{
    config::{DECIMALS, INITIAL_ANSWER},
    deployer::{DeployEnvironment, DeployOptions},
    error::DeployError,
};

use super::DeployScript;

pub const MOCK_V3_AGGREGATOR: &str = "MockV3Aggregator";

/// Deploys a fake ETH/USD price feed on development chains.
pub struct DeployMocks;

pub fn mock_constructor_args() -> Vec<Token> {
    vec![
        Token::Uint(DECIMALS.into()),
        Token::Int(I256::from(INITIAL_ANSWER).into_raw()),
    ]
}

#[async_trait]
impl DeployScript for DeployMocks {
    fn id(&self) -> &'static str {
        "00-deploy-mocks"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["all", "mocks"]
    }

    async fn run(&self, env: &mut DeployEnvironment) -> Result<(), DeployError> {
        if !env.network.is_development_chain() {
            return Ok(());
        }

        info!("Local network detected! Deploying mocks...");
        env.deploy(
            MOCK_V3_AGGREGATOR,
            DeployOptions {
                contract: Some(MOCK_V3_AGGREGATOR.to_owned()),
                args: mock_constructor_args(),
                ..Default::default()
            },
        )
        .await?;
        info!("Mocks deployed!");
        info!("--------------------");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ethers::{abi::ParamType, types::U256};

    use super::*;

    #[test]
    fn test_mock_args_encode_as_constructor_expects() {
        let encoded = ethers::abi::encode(&mock_constructor_args());
        let decoded =
            ethers::abi::decode(&[ParamType::Uint(8), ParamType::Int(256)], &encoded).unwrap();

        assert_eq!(decoded[0], Token::Uint(U256::from(8)));
        assert_eq!(
            I256::from_raw(decoded[1].clone().into_int().unwrap()),
            I256::from(200_000_000_000i64)
        );
    }
}
