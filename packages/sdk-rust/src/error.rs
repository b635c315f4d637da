//! SDK error type.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// All errors returned by the X1-Swap SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Environment ──────────────────────────────────────────────────────────
    /// No wallet provider could be found at session start.
    #[error("Wallet extension not installed")]
    WalletNotInstalled,

    /// The wallet granted access but returned no accounts.
    #[error("Wallet returned no accounts")]
    NoAccounts,

    // ── User rejection ───────────────────────────────────────────────────────
    /// The user declined an account or transaction request (EIP-1193 4001).
    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    // ── Liquidity ────────────────────────────────────────────────────────────
    /// The router could not price the path.
    #[error("No pool for path {0} -> {1}")]
    NoPool(Address, Address),

    // ── On-chain execution ───────────────────────────────────────────────────
    /// The wallet or node refused the call because execution would fail.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// The transaction was mined with status 0.
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    /// No receipt appeared before the confirmation timeout.
    #[error("Timed out waiting for transaction {0}")]
    ConfirmationTimeout(TxHash),

    // ── Transport ────────────────────────────────────────────────────────────
    /// HTTP-level failure talking to the wallet endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON-RPC error object that is not a rejection or revert.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// A JSON-RPC result had an unexpected shape.
    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),

    /// Return data could not be ABI-decoded.
    #[error("ABI decode error: {0}")]
    Abi(#[from] alloy::sol_types::Error),

    // ── Validation ───────────────────────────────────────────────────────────
    /// An amount string is not a non-negative decimal.
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    /// The symbol or address is not in the configured token list.
    #[error("Unknown token '{0}'")]
    UnknownToken(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure taxonomy.
///
/// Only [`FailureKind::Environment`] is shown to the user verbatim; every
/// other kind collapses into [`GENERIC_FAILURE_MESSAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Environment,
    UserRejected,
    Liquidity,
    Execution,
    Transport,
    Invalid,
}

/// Message shown for every failure except a missing wallet.
pub const GENERIC_FAILURE_MESSAGE: &str = "Transaction failed. Check the pool and your balance.";

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::WalletNotInstalled | Error::NoAccounts => FailureKind::Environment,
            Error::UserRejected(_) => FailureKind::UserRejected,
            Error::NoPool(..) => FailureKind::Liquidity,
            Error::Execution(_) | Error::Reverted(_) | Error::ConfirmationTimeout(_) => {
                FailureKind::Execution
            }
            Error::Http(_) | Error::Rpc { .. } | Error::MalformedResponse(_) | Error::Abi(_) => {
                FailureKind::Transport
            }
            Error::InvalidAmount(_)
            | Error::UnknownToken(_)
            | Error::InvalidArgument(_)
            | Error::Config(_) => FailureKind::Invalid,
        }
    }

    /// Text suitable for an end-user acknowledgment.
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::Environment => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Classify a JSON-RPC error object.
    pub(crate) fn from_rpc(code: i64, message: String) -> Self {
        if code == USER_REJECTED_CODE {
            return Error::UserRejected(message);
        }
        // Code 3 is the geth convention for "execution reverted" with data.
        let lower = message.to_ascii_lowercase();
        if code == 3 || lower.contains("revert") || lower.contains("out of gas") {
            return Error::Execution(message);
        }
        Error::Rpc { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_codes_map_to_kinds() {
        assert_eq!(
            Error::from_rpc(4001, "User denied".into()).kind(),
            FailureKind::UserRejected
        );
        assert_eq!(
            Error::from_rpc(3, "execution reverted".into()).kind(),
            FailureKind::Execution
        );
        assert_eq!(
            Error::from_rpc(-32000, "gas required exceeds allowance: out of gas".into()).kind(),
            FailureKind::Execution
        );
        assert_eq!(
            Error::from_rpc(-32601, "method not found".into()).kind(),
            FailureKind::Transport
        );
    }

    #[test]
    fn only_environment_errors_surface_detail() {
        assert_eq!(
            Error::WalletNotInstalled.user_message(),
            "Wallet extension not installed"
        );
        assert_eq!(
            Error::UserRejected("nope".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            Error::Reverted(TxHash::ZERO).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
