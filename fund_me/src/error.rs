use thiserror::Error;

/// Errors of the deploy pipeline.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Invalid or missing setting
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown network '{0}', set CHAIN_ID to use it")]
    UnknownNetwork(String),

    /// No ETH/USD price feed configured for a live chain
    #[error("no ETH/USD price feed configured for chain {chain_id}")]
    MissingPriceFeed { chain_id: u64 },

    #[error("connected to chain {actual} but network '{network}' expects chain {expected}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("artifact for contract '{0}' not found, did you run `hardhat compile`?")]
    ArtifactNotFound(String),

    #[error("multiple artifacts found for contract '{0}'")]
    AmbiguousArtifact(String),

    #[error("invalid artifact '{name}': {reason}")]
    InvalidArtifact { name: String, reason: String },

    #[error("no deployment found for: {0}")]
    DeploymentNotFound(String),

    #[error("error deploying '{name}': {reason}")]
    ContractDeployment { name: String, reason: String },

    #[error("error interacting with contract: {0}")]
    ContractInteraction(String),

    #[error(transparent)]
    Provider(#[from] ethers::providers::ProviderError),

    #[error(transparent)]
    Wallet(#[from] ethers::signers::WalletError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
