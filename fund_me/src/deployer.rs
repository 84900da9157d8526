use std::sync::Arc;

use chrono::Utc;
use ethers::{
    abi::{self, Token},
    contract::ContractFactory,
    providers::Middleware,
    types::{Address, Bytes},
};
use tracing::info;

use crate::{
    artifacts::Artifacts,
    client::{get_writer_ethers_client, EtherSigner},
    config::NetworkSettings,
    deployments::{DeploymentRecord, DeploymentStore},
    error::DeployError,
    scripts,
};

pub struct DeployOptions {
    /// artifact to deploy, defaults to the deployment name
    pub contract: Option<String>,
    pub args: Vec<Token>,
    pub wait_confirmations: usize,
    pub log: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            contract: None,
            args: Vec::new(),
            wait_confirmations: 1,
            log: true,
        }
    }
}

/// A connected network plus its deployment records.
pub struct DeployEnvironment {
    pub network: NetworkSettings,
    deployer: Arc<EtherSigner>,
    artifacts: Artifacts,
    deployments: DeploymentStore,
}

impl DeployEnvironment {
    /// Connects the deployer account and loads the network's records.
    pub async fn connect(network: NetworkSettings) -> Result<Self, DeployError> {
        let deployer = get_writer_ethers_client(0, &network)?;

        let actual = deployer.provider().get_chainid().await?.as_u64();
        if actual != network.chain_id {
            return Err(DeployError::ChainIdMismatch {
                network: network.name.clone(),
                expected: network.chain_id,
                actual,
            });
        }

        // the hardhat network doesn't outlive the process that uses it
        let deployments = if network.name == "hardhat" {
            DeploymentStore::in_memory()
        } else {
            DeploymentStore::open(
                network.deployments_path.join(&network.name),
                network.chain_id,
            )?
        };

        Ok(Self {
            artifacts: Artifacts::new(&network.artifacts_path),
            network,
            deployer,
            deployments,
        })
    }

    pub fn deployer(&self) -> Arc<EtherSigner> {
        self.deployer.clone()
    }

    pub fn deployer_address(&self) -> Address {
        self.deployer.address()
    }

    /// Client for the `index`-th named account (`0` is the deployer).
    pub fn signer(&self, index: u32) -> Result<Arc<EtherSigner>, DeployError> {
        if index == 0 {
            return Ok(self.deployer());
        }
        get_writer_ethers_client(index, &self.network)
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn deployments(&self) -> &DeploymentStore {
        &self.deployments
    }

    pub fn get(&self, name: &str) -> Result<&DeploymentRecord, DeployError> {
        self.deployments
            .get(name)
            .ok_or_else(|| DeployError::DeploymentNotFound(name.to_owned()))
    }

    pub async fn deploy(
        &mut self,
        name: &str,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError> {
        let contract_name = options.contract.as_deref().unwrap_or(name);
        let artifact = self.artifacts.load(contract_name)?;
        let args_display: Vec<String> = options.args.iter().map(format_token).collect();

        if let Some(existing) = self.deployments.get(name) {
            if existing.bytecode_hash == artifact.bytecode_hash()
                && existing.args == args_display
                && !self
                    .deployer
                    .provider()
                    .get_code(existing.address, None)
                    .await?
                    .is_empty()
            {
                if options.log {
                    info!("reusing \"{name}\" at {:?}", existing.address);
                }
                return Ok(existing.clone());
            }
        }

        let constructor_arguments = Bytes::from(abi::encode(&options.args));

        let factory = ContractFactory::new(
            artifact.parse_abi()?,
            artifact.bytecode.clone(),
            self.deployer.clone(),
        );
        let deployer = factory
            .deploy_tokens(options.args)
            .map_err(|e| DeployError::ContractDeployment {
                name: name.to_owned(),
                reason: e.to_string(),
            })?
            .confirmations(options.wait_confirmations);

        let (contract, receipt) =
            deployer
                .send_with_receipt()
                .await
                .map_err(|e| DeployError::ContractDeployment {
                    name: name.to_owned(),
                    reason: e.to_string(),
                })?;

        if options.log {
            info!(
                "deploying \"{name}\" (tx: {:?})...: deployed at {:?} with {} gas",
                receipt.transaction_hash,
                contract.address(),
                receipt.gas_used.unwrap_or_default()
            );
        }

        let record = DeploymentRecord {
            address: contract.address(),
            abi: artifact.abi.clone(),
            args: args_display,
            constructor_arguments,
            transaction_hash: Some(receipt.transaction_hash),
            block_number: receipt.block_number,
            bytecode_hash: artifact.bytecode_hash(),
            deployed_at: Utc::now(),
        };
        self.deployments.save(name, record.clone())?;

        Ok(record)
    }

    /// Runs the deploy scripts selected by `tags` (all of them when empty).
    pub async fn run_scripts(&mut self, tags: &[&str]) -> Result<(), DeployError> {
        scripts::run(self, tags).await
    }

    /// Fresh deployment of the scripts selected by `tags`.
    pub async fn fixture(&mut self, tags: &[&str]) -> Result<(), DeployError> {
        self.deployments.clear()?;
        self.run_scripts(tags).await
    }
}

fn format_token(token: &Token) -> String {
    match token {
        Token::Address(address) => format!("{address:?}"),
        Token::Int(raw) => ethers::types::I256::from_raw(*raw).to_string(),
        Token::Uint(value) => value.to_string(),
        other => other.to_string(),
    }
}
