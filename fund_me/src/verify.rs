//! Block explorer verification.
//!
//! [`EtherscanVerifier`] submits the standard-json compiler input of a
//! deployment and polls for the outcome. [`verify`] wraps any
//! [`ContractVerifier`] so that a failed verification never fails a
//! deployment: "already verified" counts as success, anything else is logged.

use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, Bytes};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    artifacts::Artifacts, config::NetworkSettings, deployments::DeploymentRecord,
    error::DeployError,
};

const ALREADY_VERIFIED: &str = "already verified";
const PENDING: &str = "pending in queue";
const VERIFIED_PASS: &str = "pass - verified";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_POLLS: usize = 20;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("verification still pending after {0} status checks")]
    StillPending(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    /// failure that was logged and swallowed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    pub address: Address,
    /// fully qualified name, `contracts/FundMe.sol:FundMe`
    pub contract_name: String,
    /// e.g. `v0.8.8+commit.dddeac2f`
    pub compiler_version: String,
    /// standard-json compiler input
    pub source: serde_json::Value,
    pub constructor_arguments: Bytes,
}

impl VerificationRequest {
    pub fn for_deployment(
        artifacts: &Artifacts,
        contract_name: &str,
        deployment: &DeploymentRecord,
    ) -> Result<Self, DeployError> {
        let artifact = artifacts.load(contract_name)?;
        let build_info = artifacts.build_info(contract_name)?;

        Ok(Self {
            address: deployment.address,
            contract_name: artifact.fully_qualified_name(),
            compiler_version: format!("v{}", build_info.solc_long_version),
            source: build_info.input,
            constructor_arguments: deployment.constructor_arguments.clone(),
        })
    }
}

#[async_trait]
pub trait ContractVerifier: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> Result<(), VerifyError>;
}

/// Verifies `request`, tolerating every failure.
pub async fn verify(
    verifier: &dyn ContractVerifier,
    request: &VerificationRequest,
) -> VerificationOutcome {
    info!("Verifying contract...");
    match verifier.verify(request).await {
        Ok(()) => {
            info!("Successfully verified {:?}", request.address);
            VerificationOutcome::Verified
        }
        Err(e) if is_already_verified(&e.to_string()) => {
            info!("Already Verified!");
            VerificationOutcome::AlreadyVerified
        }
        Err(e) => {
            warn!("verification of {:?} failed: {e}", request.address);
            VerificationOutcome::Failed(e.to_string())
        }
    }
}

pub fn is_already_verified(message: &str) -> bool {
    message.to_lowercase().contains(ALREADY_VERIFIED)
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: String,
}

pub struct EtherscanVerifier {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    chain_id: u64,
    poll_interval: Duration,
    max_polls: usize,
}

impl EtherscanVerifier {
    pub fn new(api_url: Url, api_key: impl Into<String>, chain_id: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key: api_key.into(),
            chain_id,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    pub fn from_network(network: &NetworkSettings) -> Result<Self, DeployError> {
        let api_key = network
            .etherscan_api_key
            .clone()
            .ok_or_else(|| DeployError::Config("ETHERSCAN_API_KEY is not set".into()))?;
        let api_url = Url::parse(&network.etherscan_api_url).map_err(|e| {
            DeployError::Config(format!(
                "invalid explorer url '{}': {e}",
                network.etherscan_api_url
            ))
        })?;

        Ok(Self::new(api_url, api_key, network.chain_id))
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: usize) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    async fn submit(&self, request: &VerificationRequest) -> Result<String, VerifyError> {
        let source = request.source.to_string();
        let address = format!("{:?}", request.address);
        let constructor_arguments = hex::encode(&request.constructor_arguments);

        let form = [
            ("apikey", self.api_key.as_str()),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", source.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract_name.as_str()),
            ("compilerversion", request.compiler_version.as_str()),
            // sic, etherscan's spelling
            ("constructorArguements", constructor_arguments.as_str()),
        ];

        let response: EtherscanResponse = self
            .client
            .post(self.api_url.clone())
            .query(&[("chainid", self.chain_id.to_string())])
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "1" {
            return Err(VerifyError::Rejected(format!(
                "{}: {}",
                response.message, response.result
            )));
        }

        // on success `result` is the guid of the verification job
        Ok(response.result)
    }

    async fn check_status(&self, guid: &str) -> Result<EtherscanResponse, VerifyError> {
        let chain_id = self.chain_id.to_string();
        Ok(self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("chainid", chain_id.as_str()),
                ("apikey", self.api_key.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

#[async_trait]
impl ContractVerifier for EtherscanVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<(), VerifyError> {
        let guid = self.submit(request).await?;
        debug!("verification submitted, guid {guid}");

        for _ in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let status = self.check_status(&guid).await?;
            let result = status.result.to_lowercase();
            if result.contains(PENDING) {
                continue;
            }
            if status.status == "1" || result.contains(VERIFIED_PASS) {
                return Ok(());
            }
            return Err(VerifyError::Rejected(status.result));
        }

        Err(VerifyError::StillPending(self.max_polls))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn request() -> VerificationRequest {
        VerificationRequest {
            address: Address::repeat_byte(0x11),
            contract_name: "contracts/FundMe.sol:FundMe".into(),
            compiler_version: "v0.8.8+commit.dddeac2f".into(),
            source: json!({ "language": "Solidity", "sources": {} }),
            constructor_arguments: Bytes::from(vec![0xaa; 32]),
        }
    }

    async fn verifier_for(server: &MockServer) -> EtherscanVerifier {
        let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
        EtherscanVerifier::new(url, "KEY", 11155111).with_polling(Duration::from_millis(1), 3)
    }

    fn etherscan(status: &str, message: &str, result: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": status,
            "message": message,
            "result": result,
        }))
    }

    struct FailingVerifier(&'static str);

    #[async_trait]
    impl ContractVerifier for FailingVerifier {
        async fn verify(&self, _request: &VerificationRequest) -> Result<(), VerifyError> {
            Err(VerifyError::Rejected(self.0.to_owned()))
        }
    }

    #[test]
    fn test_already_verified_is_case_insensitive() {
        assert!(is_already_verified("Contract source code already verified"));
        assert!(is_already_verified("ALREADY VERIFIED"));
        assert!(is_already_verified("Reason: Already Verified"));
        assert!(!is_already_verified("Fail - Unable to verify"));
    }

    #[tokio::test]
    async fn test_verify_tolerates_failures() {
        let outcome = verify(&FailingVerifier("Already Verified"), &request()).await;
        assert_eq!(outcome, VerificationOutcome::AlreadyVerified);

        let outcome = verify(&FailingVerifier("Invalid API Key"), &request()).await;
        assert_eq!(
            outcome,
            VerificationOutcome::Failed("Invalid API Key".into())
        );
    }

    #[tokio::test]
    async fn test_etherscan_verified_after_pending() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .and(query_param("chainid", "11155111"))
            .and(body_string_contains("action=verifysourcecode"))
            .and(body_string_contains(
                "contractname=contracts%2FFundMe.sol%3AFundMe",
            ))
            .and(body_string_contains(
                "constructorArguements=aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            ))
            .respond_with(etherscan("1", "OK", "guid-123"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "checkverifystatus"))
            .and(query_param("guid", "guid-123"))
            .respond_with(etherscan("0", "NOTOK", "Pending in queue"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "checkverifystatus"))
            .respond_with(etherscan("1", "OK", "Pass - Verified"))
            .mount(&server)
            .await;

        let outcome = verify(&verifier_for(&server).await, &request()).await;
        assert_eq!(outcome, VerificationOutcome::Verified);
    }

    #[tokio::test]
    async fn test_etherscan_already_verified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(etherscan(
                "0",
                "NOTOK",
                "Contract source code already verified",
            ))
            .mount(&server)
            .await;

        let outcome = verify(&verifier_for(&server).await, &request()).await;
        assert_eq!(outcome, VerificationOutcome::AlreadyVerified);
    }

    #[tokio::test]
    async fn test_etherscan_rejection_is_swallowed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(etherscan("1", "OK", "guid-456"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(etherscan(
                "0",
                "NOTOK",
                "Fail - Unable to verify. Compiled contract deployment bytecode does NOT match",
            ))
            .mount(&server)
            .await;

        let outcome = verify(&verifier_for(&server).await, &request()).await;
        assert!(matches!(outcome, VerificationOutcome::Failed(reason) if reason.starts_with("Fail")));
    }

    #[tokio::test]
    async fn test_etherscan_gives_up_while_pending() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(etherscan("1", "OK", "guid-789"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(etherscan("0", "NOTOK", "Pending in queue"))
            .expect(3)
            .mount(&server)
            .await;

        let err = verifier_for(&server).await.verify(&request()).await.unwrap_err();
        assert!(matches!(err, VerifyError::StillPending(3)));
    }

    #[tokio::test]
    async fn test_etherscan_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let outcome = verify(&verifier_for(&server).await, &request()).await;
        assert!(matches!(outcome, VerificationOutcome::Failed(_)));
    }

    #[test]
    fn test_from_network_requires_api_key() {
        let network = NetworkSettings::from_lookup("hardhat", |_| None).unwrap();
        assert!(matches!(
            EtherscanVerifier::from_network(&network),
            Err(DeployError::Config(_))
        ));
    }
}
