//! Network configuration: the static chain table, development chains, mock
//! oracle constants and the runtime [`NetworkSettings`] read from the
//! environment.

use std::{env, fmt, path::PathBuf};

use crate::error::DeployError;

/// Networks treated as local and ephemeral.
pub const DEVELOPMENT_CHAINS: &[&str] = &["hardhat", "localhost"];

/// Decimals the mock price feed reports.
pub const DECIMALS: u8 = 8;
/// Initial ETH/USD answer of the mock price feed (2000 USD, 8 decimals).
pub const INITIAL_ANSWER: i64 = 200_000_000_000;

pub const DEFAULT_BLOCK_CONFIRMATIONS: usize = 1;

pub const NETWORK_ENV_VAR: &str = "NETWORK";
const RPC_URL_ENV_VAR: &str = "RPC_URL";
const CHAIN_ID_ENV_VAR: &str = "CHAIN_ID";
const BLOCK_CONFIRMATIONS_ENV_VAR: &str = "BLOCK_CONFIRMATIONS";
const MNEMONIC_ENV_VAR: &str = "MNEMONIC";
const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";
const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";
const ETHERSCAN_API_URL_ENV_VAR: &str = "ETHERSCAN_API_URL";
const ARTIFACTS_PATH_ENV_VAR: &str = "ARTIFACTS_PATH";
const DEPLOYMENTS_PATH_ENV_VAR: &str = "DEPLOYMENTS_PATH";

pub const DEFAULT_NETWORK: &str = "hardhat";
const DEFAULT_DEV_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_DEV_CHAIN_ID: u64 = 31337;
/// Mnemonic of the accounts pre-funded by `hardhat node` and `anvil`.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";
const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";
const DEFAULT_ARTIFACTS_PATH: &str = "smart-contracts/artifacts";
const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments";

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfigEntry {
    pub chain_id: u64,
    pub name: &'static str,
    pub eth_usd_price_feed: Option<&'static str>,
    pub block_confirmations: Option<usize>,
}

// https://docs.chain.link/data-feeds/price-feeds/addresses
const NETWORK_CONFIG: &[NetworkConfigEntry] = &[
    NetworkConfigEntry {
        chain_id: 31337,
        name: "localhost",
        eth_usd_price_feed: None,
        block_confirmations: None,
    },
    NetworkConfigEntry {
        chain_id: 4,
        name: "rinkeby",
        eth_usd_price_feed: Some("0x8A753747A1Fa494EC906cE90E9f37563A8AF630e"),
        block_confirmations: Some(6),
    },
    NetworkConfigEntry {
        chain_id: 5,
        name: "goerli",
        eth_usd_price_feed: Some("0xD4a33860578De61DBAbDc8BFdb98FD742fA7028e"),
        block_confirmations: Some(6),
    },
    NetworkConfigEntry {
        chain_id: 137,
        name: "polygon",
        eth_usd_price_feed: Some("0xF9680D99D6C9589e2a93a78A04A279e509205945"),
        block_confirmations: None,
    },
    NetworkConfigEntry {
        chain_id: 11155111,
        name: "sepolia",
        eth_usd_price_feed: Some("0x694AA1769357215DE4FAC081bf1f309aDC325306"),
        block_confirmations: Some(6),
    },
];

pub fn network_config(chain_id: u64) -> Option<&'static NetworkConfigEntry> {
    NETWORK_CONFIG.iter().find(|entry| entry.chain_id == chain_id)
}

pub fn network_config_by_name(name: &str) -> Option<&'static NetworkConfigEntry> {
    NETWORK_CONFIG.iter().find(|entry| entry.name == name)
}

pub fn is_development_chain(network_name: &str) -> bool {
    DEVELOPMENT_CHAINS.contains(&network_name)
}

/// Where signing keys for a network come from.
#[derive(Clone, PartialEq)]
pub enum AccountsConfig {
    /// HD wallet, named accounts are derivation indices
    Mnemonic(String),
    /// Single account
    PrivateKey(String),
}

impl fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountsConfig::Mnemonic(_) => write!(f, "Mnemonic(<redacted>)"),
            AccountsConfig::PrivateKey(_) => write!(f, "PrivateKey(<redacted>)"),
        }
    }
}

/// Runtime settings of the network a command or test runs against.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkSettings {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub block_confirmations: Option<usize>,
    pub accounts: AccountsConfig,
    pub etherscan_api_key: Option<String>,
    pub etherscan_api_url: String,
    pub artifacts_path: PathBuf,
    pub deployments_path: PathBuf,
}

impl NetworkSettings {
    /// load the settings of `network_name` from the process env (and `.env`)
    pub fn load(network_name: &str) -> Result<Self, DeployError> {
        dotenv::dotenv().ok();
        Self::from_lookup(network_name, |key| env::var(key).ok())
    }

    /// name of the selected network, `hardhat` unless `NETWORK` is set
    pub fn selected_network_name() -> String {
        dotenv::dotenv().ok();
        env::var(NETWORK_ENV_VAR).unwrap_or_else(|_| DEFAULT_NETWORK.to_owned())
    }

    pub fn from_lookup<F>(network_name: &str, lookup: F) -> Result<Self, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network_rpc_var = format!(
            "{}_{RPC_URL_ENV_VAR}",
            network_name.to_uppercase().replace('-', "_")
        );
        let rpc_url = lookup(&network_rpc_var).or_else(|| lookup(RPC_URL_ENV_VAR));

        let chain_id = match lookup(CHAIN_ID_ENV_VAR) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                DeployError::Config(format!("invalid {CHAIN_ID_ENV_VAR} '{raw}': {e}"))
            })?),
            None => None,
        };

        let block_confirmations = match lookup(BLOCK_CONFIRMATIONS_ENV_VAR) {
            Some(raw) => Some(raw.parse::<usize>().map_err(|e| {
                DeployError::Config(format!(
                    "invalid {BLOCK_CONFIRMATIONS_ENV_VAR} '{raw}': {e}"
                ))
            })?),
            None => None,
        };

        let private_key = lookup(PRIVATE_KEY_ENV_VAR);
        let mnemonic = lookup(MNEMONIC_ENV_VAR);

        let (chain_id, rpc_url, accounts) = if is_development_chain(network_name) {
            // named accounts on dev chains are always mnemonic indices
            let accounts =
                AccountsConfig::Mnemonic(mnemonic.unwrap_or_else(|| DEV_MNEMONIC.to_owned()));
            (
                chain_id.unwrap_or(DEFAULT_DEV_CHAIN_ID),
                rpc_url.unwrap_or_else(|| DEFAULT_DEV_RPC_URL.to_owned()),
                accounts,
            )
        } else {
            let chain_id = chain_id
                .or_else(|| network_config_by_name(network_name).map(|c| c.chain_id))
                .ok_or_else(|| DeployError::UnknownNetwork(network_name.to_owned()))?;
            let rpc_url = rpc_url.ok_or_else(|| {
                DeployError::Config(format!(
                    "no RPC url for network '{network_name}', set {network_rpc_var}"
                ))
            })?;
            let accounts = match (private_key, mnemonic) {
                (Some(key), _) => AccountsConfig::PrivateKey(key),
                (None, Some(phrase)) => AccountsConfig::Mnemonic(phrase),
                (None, None) => {
                    return Err(DeployError::Config(format!(
                        "no accounts for network '{network_name}', set {PRIVATE_KEY_ENV_VAR} or {MNEMONIC_ENV_VAR}"
                    )))
                }
            };
            (chain_id, rpc_url, accounts)
        };

        url::Url::parse(&rpc_url)
            .map_err(|e| DeployError::Config(format!("invalid RPC url '{rpc_url}': {e}")))?;

        Ok(Self {
            name: network_name.to_owned(),
            chain_id,
            rpc_url,
            block_confirmations: block_confirmations
                .or_else(|| network_config(chain_id).and_then(|c| c.block_confirmations)),
            accounts,
            etherscan_api_key: lookup(ETHERSCAN_API_KEY_ENV_VAR).filter(|k| !k.is_empty()),
            etherscan_api_url: lookup(ETHERSCAN_API_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_ETHERSCAN_API_URL.to_owned()),
            artifacts_path: lookup(ARTIFACTS_PATH_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_ARTIFACTS_PATH.to_owned())
                .into(),
            deployments_path: lookup(DEPLOYMENTS_PATH_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_DEPLOYMENTS_PATH.to_owned())
                .into(),
        })
    }

    pub fn is_development_chain(&self) -> bool {
        is_development_chain(&self.name)
    }

    /// confirmations to wait for after a deployment transaction
    pub fn wait_confirmations(&self) -> usize {
        self.block_confirmations.unwrap_or(DEFAULT_BLOCK_CONFIRMATIONS)
    }

    /// live networks with an explorer key get their deployments verified
    pub fn should_verify(&self) -> bool {
        !self.is_development_chain() && self.etherscan_api_key.is_some()
    }
}
