//! Deployment records, kept in memory for the ephemeral `hardhat` network and
//! persisted under `<deployments>/<network>/<Name>.json` for every other one.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, H256, U64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DeployError;

const CHAIN_ID_FILE: &str = ".chainId";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub abi: serde_json::Value,
    /// display form of the constructor arguments
    pub args: Vec<String>,
    /// abi-encoded constructor arguments, as expected by block explorers
    pub constructor_arguments: Bytes,
    pub transaction_hash: Option<H256>,
    pub block_number: Option<U64>,
    pub bytecode_hash: H256,
    pub deployed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct DeploymentStore {
    records: BTreeMap<String, DeploymentRecord>,
    dir: Option<PathBuf>,
}

impl DeploymentStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens (and loads) the store of one network. Records written for a
    /// different chain id are discarded.
    pub fn open(dir: impl Into<PathBuf>, chain_id: u64) -> Result<Self, DeployError> {
        let dir = dir.into();
        let chain_id_path = dir.join(CHAIN_ID_FILE);

        if dir.is_dir() {
            let recorded_chain_id = fs::read_to_string(&chain_id_path)
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok());
            if recorded_chain_id.is_some_and(|id| id != chain_id) {
                debug!("deployments in {dir:?} belong to another chain, discarding");
                fs::remove_dir_all(&dir)?;
            }
        }

        fs::create_dir_all(&dir)?;
        fs::write(&chain_id_path, chain_id.to_string())?;

        let mut records = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = record_name(&path) else {
                continue;
            };
            let record: DeploymentRecord = serde_json::from_str(&fs::read_to_string(&path)?)?;
            records.insert(name, record);
        }

        Ok(Self {
            records,
            dir: Some(dir),
        })
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn save(&mut self, name: &str, record: DeploymentRecord) -> Result<(), DeployError> {
        if let Some(dir) = &self.dir {
            fs::write(
                dir.join(format!("{name}.json")),
                serde_json::to_string_pretty(&record)?,
            )?;
        }
        self.records.insert(name.to_owned(), record);
        Ok(())
    }

    /// Forget every record, on disk too.
    pub fn clear(&mut self) -> Result<(), DeployError> {
        if let Some(dir) = &self.dir {
            for name in self.records.keys() {
                let path = dir.join(format!("{name}.json"));
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
        self.records.clear();
        Ok(())
    }
}

fn record_name(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}
