//! Turn the form into the exact router call to make.
//!
//! Pure: given the form, decide which entry point to call, with which
//! amounts, and which ERC-20 (if any) must be approved first.

use alloy::primitives::{Address, U256};

use crate::error::{Error, Result};
use crate::state::Form;
use crate::types::Mode;
use crate::units;

/// Allowance the router needs before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub token:  Address,
    pub amount: U256,
}

/// Router entry point plus arguments (deadline and recipient are added at
/// submission time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterCall {
    SwapExactEthForTokens {
        path:  Vec<Address>,
        value: U256,
    },
    SwapExactTokensForEth {
        amount_in: U256,
        path:      Vec<Address>,
    },
    AddLiquidityEth {
        token:         Address,
        amount_token:  U256,
        amount_native: U256,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub approval: Option<Approval>,
    pub call:     RouterCall,
}

impl Form {
    /// Build the plan for the current inputs.
    pub fn plan(&self) -> Result<ActionPlan> {
        let value_a = units::to_base_units(&self.amount_a)?;
        match self.mode {
            Mode::Swap => self.plan_swap(value_a),
            Mode::Liquidity => self.plan_liquidity(value_a),
        }
    }

    fn plan_swap(&self, value_a: U256) -> Result<ActionPlan> {
        if self.same_tokens() {
            return Err(Error::InvalidArgument("pay and receive tokens must differ".into()));
        }
        if !self.token_a.native && !self.token_b.native {
            return Err(Error::InvalidArgument(format!(
                "{} -> {}: the router only swaps against the native token",
                self.token_a.symbol, self.token_b.symbol
            )));
        }
        let path = vec![self.token_a.address, self.token_b.address];
        if self.token_a.native {
            Ok(ActionPlan {
                approval: None,
                call: RouterCall::SwapExactEthForTokens { path, value: value_a },
            })
        } else {
            Ok(ActionPlan {
                approval: Some(Approval { token: self.token_a.address, amount: value_a }),
                call: RouterCall::SwapExactTokensForEth { amount_in: value_a, path },
            })
        }
    }

    fn plan_liquidity(&self, value_a: U256) -> Result<ActionPlan> {
        if self.token_a.native == self.token_b.native {
            return Err(Error::InvalidArgument(
                "liquidity needs the native token on exactly one side".into(),
            ));
        }
        let value_b = self.amount_b.to_base_units()?;
        let (token, amount_token, amount_native) = if self.token_a.native {
            (self.token_b.address, value_b, value_a)
        } else {
            (self.token_a.address, value_a, value_b)
        };
        Ok(ActionPlan {
            approval: Some(Approval { token, amount: amount_token }),
            call: RouterCall::AddLiquidityEth { token, amount_token, amount_native },
        })
    }
}
