use std::{str::FromStr, sync::Arc, time::Duration};

use ethers::{
    core::k256::ecdsa::SigningKey,
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer, Wallet},
};

use crate::{
    config::{AccountsConfig, NetworkSettings},
    error::DeployError,
};

pub type EtherSigner = SignerMiddleware<Provider<Http>, Wallet<SigningKey>>;

// local nodes mine instantly, no need for the default 7s receipt polling
const DEV_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn get_read_only_ethers_client(network: &NetworkSettings) -> Result<Provider<Http>, DeployError> {
    let provider = Provider::<Http>::try_from(network.rpc_url.as_str())
        .map_err(|e| DeployError::Config(format!("invalid RPC url '{}': {e}", network.rpc_url)))?;

    Ok(if network.is_development_chain() {
        provider.interval(DEV_POLL_INTERVAL)
    } else {
        provider
    })
}

/// Client signing as the `id`-th named account of `network`.
/// Only account `0` exists when the network is configured with a private key.
pub fn get_writer_ethers_client(
    id: u32,
    network: &NetworkSettings,
) -> Result<Arc<EtherSigner>, DeployError> {
    let wallet = match &network.accounts {
        AccountsConfig::Mnemonic(phrase) => MnemonicBuilder::<English>::default()
            .phrase(phrase.as_str())
            .index(id)?
            .build()?,
        AccountsConfig::PrivateKey(key) if id == 0 => LocalWallet::from_str(key)?,
        AccountsConfig::PrivateKey(_) => {
            return Err(DeployError::Config(format!(
                "network '{}' only has a single account, requested account #{id}",
                network.name
            )))
        }
    }
    .with_chain_id(network.chain_id);

    let provider = get_read_only_ethers_client(network)?;
    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

#[cfg(test)]
mod tests {
    use ethers::types::Address;

    use super::*;

    fn dev_network() -> NetworkSettings {
        NetworkSettings::from_lookup("hardhat", |_| None).unwrap()
    }

    #[test]
    fn test_dev_accounts_match_node_defaults() {
        let network = dev_network();

        let deployer = get_writer_ethers_client(0, &network).unwrap();
        let second = get_writer_ethers_client(1, &network).unwrap();

        // first two accounts of `hardhat node` / `anvil`
        assert_eq!(
            deployer.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(
            second.address(),
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(deployer.signer().chain_id(), 31337);
    }

    #[test]
    fn test_private_key_has_single_account() {
        let mut network = dev_network();
        network.accounts = AccountsConfig::PrivateKey(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into(),
        );

        let deployer = get_writer_ethers_client(0, &network).unwrap();
        assert_eq!(
            deployer.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );

        assert!(matches!(
            get_writer_ethers_client(1, &network),
            Err(DeployError::Config(_))
        ));
    }
}
