pub mod fund_me;
pub mod mock_v3_aggregator;

use ethers::{contract::ContractError, providers::Middleware, utils::keccak256};

/// 4-byte selector of a Solidity error signature, e.g. `FundMe__NotOwner()`.
pub fn error_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Reason string of a `require`/`revert("...")`, if the error carries one.
pub fn revert_reason<M: Middleware>(err: &ContractError<M>) -> Option<String> {
    err.decode_revert::<String>()
}

/// Whether `err` is a revert with the given reason string.
///
/// Nodes don't always hand back the revert data, so the error message is
/// checked as well.
pub fn reverted_with<M: Middleware>(err: &ContractError<M>, reason: &str) -> bool {
    match revert_reason(err) {
        Some(decoded) => decoded == reason,
        None => err.to_string().contains(reason),
    }
}

/// Whether `err` is a revert with the custom error `signature`.
pub fn reverted_with_custom_error<M: Middleware>(err: &ContractError<M>, signature: &str) -> bool {
    if let Some(data) = err.as_revert() {
        return data.len() >= 4 && data[..4] == error_selector(signature);
    }

    let name = signature.split('(').next().unwrap_or(signature);
    err.to_string().contains(name)
}

/// Human readable summary of a failed contract call.
pub fn describe_contract_error<M: Middleware>(err: &ContractError<M>) -> String {
    if let Some(reason) = revert_reason(err) {
        return format!("reverted: {reason}");
    }
    if reverted_with_custom_error(err, fund_me::NOT_OWNER_ERROR) {
        return "reverted: only the owner can withdraw (FundMe__NotOwner)".to_owned();
    }
    err.to_string()
}
