//! Test suites running against a node: `unit` on development chains,
//! `staging` on live networks. Both skip when their network isn't selected
//! or reachable, printing why to stderr (`cargo test -- --nocapture`).


use std::{
    fmt::Display,
    path::Path,
    sync::{Once, OnceLock},
};

use ethers::{providers::Middleware, types::{Address, TransactionReceipt, U256}};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    artifacts::Artifacts,
    client::EtherSigner,
    config::NetworkSettings,
    deployer::DeployEnvironment,
};

static TRACING_INIT: Once = Once::new();

// every chain test signs with the same named accounts
static CHAIN_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const WORKSPACE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/..");

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Reports a skipped chain test. Printed as well as logged so that a run
/// without a node isn't mistaken for a passing one.
fn skip<T>(reason: impl Display) -> Option<T> {
    eprintln!("skipping chain test: {reason}");
    warn!("skipping chain test: {reason}");
    None
}

pub async fn lock_chain() -> MutexGuard<'static, ()> {
    CHAIN_LOCK.get_or_init(|| Mutex::new(())).lock().await
}

/// Settings of the selected network, relative paths resolved from the
/// workspace root.
fn selected_network() -> Option<NetworkSettings> {
    let name = NetworkSettings::selected_network_name();
    let mut settings = match NetworkSettings::load(&name) {
        Ok(settings) => settings,
        Err(e) => return skip(format!("cannot load network '{name}': {e}")),
    };

    let root = Path::new(WORKSPACE_ROOT);
    if settings.artifacts_path.is_relative() {
        settings.artifacts_path = root.join(&settings.artifacts_path);
    }
    if settings.deployments_path.is_relative() {
        settings.deployments_path = root.join(&settings.deployments_path);
    }
    Some(settings)
}

async fn connect(settings: NetworkSettings) -> Option<DeployEnvironment> {
    if !Artifacts::new(&settings.artifacts_path).exists() {
        return skip(format!(
            "no artifacts at {}, run `hardhat compile`",
            settings.artifacts_path.display()
        ));
    }

    let name = settings.name.clone();
    match DeployEnvironment::connect(settings).await {
        Ok(env) => {
            debug!("connected to {name}");
            Some(env)
        }
        Err(e) => skip(format!("cannot connect to '{name}': {e}")),
    }
}

/// Environment for the unit suite, `None` off development chains.
pub async fn development_chain() -> Option<DeployEnvironment> {
    init_tracing();
    let settings = selected_network()?;
    if !settings.is_development_chain() {
        return skip(format!("'{}' is not a development chain", settings.name));
    }
    connect(settings).await
}

/// Environment for the staging suite, `None` on development chains.
pub async fn live_network() -> Option<DeployEnvironment> {
    init_tracing();
    let settings = selected_network()?;
    if settings.is_development_chain() {
        return skip(format!("'{}' is a development chain", settings.name));
    }
    connect(settings).await
}

pub async fn balance_of(client: &EtherSigner, address: Address) -> U256 {
    client.provider().get_balance(address, None).await.unwrap()
}

pub fn gas_cost(receipt: &TransactionReceipt) -> U256 {
    receipt.gas_used.unwrap() * receipt.effective_gas_price.unwrap()
}

#[test]
fn test_skip_yields_no_environment() {
    init_tracing();
    assert!(skip::<DeployEnvironment>("no node").is_none());
}
