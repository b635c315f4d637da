//! Public value types shared by the session and its callers.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::error::{Error, FailureKind, Result};
use crate::units;

/// Which action the form is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Swap,
    Liquidity,
}

/// Display text of the "no pool" sentinel.
pub const NO_POOL: &str = "No Pool";

/// Second amount field: a quote in swap mode, user input in liquidity mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountB {
    Empty,
    Value(String),
    /// The router could not price the path.
    NoPool,
}

impl AmountB {
    pub fn display(&self) -> &str {
        match self {
            AmountB::Empty => "",
            AmountB::Value(v) => v,
            AmountB::NoPool => NO_POOL,
        }
    }

    /// Base units; `Empty` and `NoPool` count as zero.
    pub fn to_base_units(&self) -> Result<U256> {
        match self {
            AmountB::Value(v) if !v.is_empty() => units::to_base_units(v),
            _ => Ok(U256::ZERO),
        }
    }
}

/// Where the executor currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    Idle,
    Connecting,
    Approving,
    Submitting,
    Confirming,
}

/// Why [`crate::SwapSession::execute`] did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoAmount,
    AlreadyPending,
}

/// Confirmed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReceipt {
    pub mode:         Mode,
    /// Approval transaction sent first, if the allowance was short.
    pub approval:     Option<TxHash>,
    pub transaction:  TxHash,
    pub block_number: Option<u64>,
}

/// Failed action, as acknowledged to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub kind:    FailureKind,
    /// Generic text, except for a missing wallet.
    pub message: String,
    /// Full error text, for logs and `--json` output.
    pub detail:  String,
}

impl From<Error> for ActionFailure {
    fn from(e: Error) -> Self {
        Self { kind: e.kind(), message: e.user_message(), detail: e.to_string() }
    }
}

/// Result of one executor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Skipped(SkipReason),
    /// No session existed; the wallet was connected instead of acting.
    Connected(Address),
    Succeeded(ActionReceipt),
    Failed(ActionFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_empty_map_to_zero() {
        assert_eq!(AmountB::NoPool.to_base_units().unwrap(), U256::ZERO);
        assert_eq!(AmountB::Empty.to_base_units().unwrap(), U256::ZERO);
        assert_eq!(
            AmountB::Value("2".into()).to_base_units().unwrap(),
            U256::from(2_000_000_000_000_000_000u128)
        );
        assert_eq!(AmountB::NoPool.display(), "No Pool");
    }

    #[test]
    fn failure_hides_detail_behind_generic_message() {
        let f = ActionFailure::from(Error::UserRejected("denied".into()));
        assert_eq!(f.kind, FailureKind::UserRejected);
        assert_eq!(f.message, crate::error::GENERIC_FAILURE_MESSAGE);
        assert!(f.detail.contains("denied"));
    }
}
