//! Hardhat compiler output: contract artifacts (`hh-sol-artifact-1`) and the
//! build-info files holding the compiler input needed for verification.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ethers::{
    abi::Abi,
    types::{Bytes, H256},
    utils::keccak256,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::DeployError;

const BUILD_INFO_DIR: &str = "build-info";
const DBG_SUFFIX: &str = ".dbg.json";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn parse_abi(&self) -> Result<Abi, DeployError> {
        serde_json::from_value(self.abi.clone()).map_err(|e| DeployError::InvalidArtifact {
            name: self.contract_name.clone(),
            reason: e.to_string(),
        })
    }

    /// e.g. `contracts/FundMe.sol:FundMe`
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    pub fn bytecode_hash(&self) -> H256 {
        H256::from(keccak256(&self.bytecode))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

/// The parts of a hardhat build-info file needed to verify a contract.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_long_version: String,
    /// standard-json compiler input
    pub input: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn load(&self, contract_name: &str) -> Result<ContractArtifact, DeployError> {
        let path = self.find(contract_name)?;
        let artifact: ContractArtifact = serde_json::from_str(&fs::read_to_string(&path)?)
            .map_err(|e| DeployError::InvalidArtifact {
                name: contract_name.to_owned(),
                reason: e.to_string(),
            })?;

        if artifact.bytecode.is_empty() {
            // interfaces and abstract contracts have no creation code
            return Err(DeployError::InvalidArtifact {
                name: contract_name.to_owned(),
                reason: "artifact has no bytecode".into(),
            });
        }

        Ok(artifact)
    }

    /// Build info referenced by the `.dbg.json` file next to the artifact.
    pub fn build_info(&self, contract_name: &str) -> Result<BuildInfo, DeployError> {
        let artifact_path = self.find(contract_name)?;
        let dbg_path = artifact_path.with_file_name(format!("{contract_name}{DBG_SUFFIX}"));
        let dbg: DebugFile = read_json(contract_name, &dbg_path)?;

        let artifact_dir = artifact_path
            .parent()
            .ok_or_else(|| DeployError::ArtifactNotFound(contract_name.to_owned()))?;

        read_json(contract_name, &artifact_dir.join(dbg.build_info))
    }

    /// Artifacts live at `<root>/<source name>/<ContractName>.json`; the source
    /// name isn't known upfront so the tree is searched.
    fn find(&self, contract_name: &str) -> Result<PathBuf, DeployError> {
        if !self.exists() {
            return Err(DeployError::ArtifactNotFound(contract_name.to_owned()));
        }

        let file_name = format!("{contract_name}.json");
        let mut found = Vec::new();
        collect_matching(&self.root, &file_name, &mut found)?;

        let mut found = found.into_iter();
        match (found.next(), found.next()) {
            (Some(path), None) => Ok(path),
            (None, _) => Err(DeployError::ArtifactNotFound(contract_name.to_owned())),
            _ => Err(DeployError::AmbiguousArtifact(contract_name.to_owned())),
        }
    }
}

/// Reads a compiler output file belonging to `contract_name`, naming the file
/// when it is missing or malformed.
fn read_json<T: DeserializeOwned>(contract_name: &str, path: &Path) -> Result<T, DeployError> {
    let invalid = |reason: String| DeployError::InvalidArtifact {
        name: contract_name.to_owned(),
        reason,
    };

    let content = fs::read_to_string(path)
        .map_err(|e| invalid(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content).map_err(|e| invalid(format!("{}: {e}", path.display())))
}

fn collect_matching(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<(), DeployError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                continue;
            }
            collect_matching(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|name| name == file_name) {
            found.push(path);
        }
    }
    Ok(())
}
