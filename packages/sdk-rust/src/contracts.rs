//! Router and ERC-20 bindings.
//!
//! ABI encoding comes from `alloy::sol!`; transport goes through an
//! account-bound [`Signer`], so every handle here acts for exactly one
//! connected account.

use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::error::Result;
use crate::wallet::{PendingTx, Signer, WalletProvider};

sol! {
    /// Uniswap-V2-style router entry points used by the session.
    interface IX1Router {
        function getAmountsOut(uint amountIn, address[] calldata path)
            external view returns (uint[] memory amounts);

        function swapExactETHForTokens(
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external payable returns (uint[] memory amounts);

        function swapExactTokensForETH(
            uint amountIn,
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external returns (uint[] memory amounts);

        function addLiquidityETH(
            address token,
            uint amountTokenDesired,
            uint amountTokenMin,
            uint amountETHMin,
            address to,
            uint deadline
        ) external payable returns (uint amountToken, uint amountETH, uint liquidity);
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

/// Minimum-output / minimum-amount argument passed to every router call.
///
/// Zero disables the router's slippage protection.
pub const UNPROTECTED_MIN: U256 = U256::ZERO;

/// Allowance granted when an approval is needed ("unlimited").
pub const UNLIMITED_ALLOWANCE: U256 = U256::MAX;

// ─── Router ───────────────────────────────────────────────────────────────────

/// Signer-bound router handle.
pub struct RouterContract<W> {
    address: Address,
    signer:  Signer<W>,
}

impl<W> Clone for RouterContract<W> {
    fn clone(&self) -> Self {
        Self { address: self.address, signer: self.signer.clone() }
    }
}

impl<W: WalletProvider> RouterContract<W> {
    pub fn new(address: Address, signer: Signer<W>) -> Self {
        Self { address, signer }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Read-only quote: amounts along `path`, first element is `amount_in`.
    pub async fn get_amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>> {
        debug!(%amount_in, ?path, "getAmountsOut");
        let data = IX1Router::getAmountsOutCall { amountIn: amount_in, path }.abi_encode();
        let out = self.signer.call(self.address, data).await?;
        Ok(IX1Router::getAmountsOutCall::abi_decode_returns(&out)?)
    }

    pub async fn swap_exact_eth_for_tokens(
        &self,
        amount_out_min: U256,
        path:           Vec<Address>,
        to:             Address,
        deadline:       U256,
        value:          U256,
    ) -> Result<PendingTx<W>> {
        let data = IX1Router::swapExactETHForTokensCall {
            amountOutMin: amount_out_min,
            path,
            to,
            deadline,
        }
        .abi_encode();
        self.signer.send(self.address, data, value).await
    }

    pub async fn swap_exact_tokens_for_eth(
        &self,
        amount_in:      U256,
        amount_out_min: U256,
        path:           Vec<Address>,
        to:             Address,
        deadline:       U256,
    ) -> Result<PendingTx<W>> {
        let data = IX1Router::swapExactTokensForETHCall {
            amountIn: amount_in,
            amountOutMin: amount_out_min,
            path,
            to,
            deadline,
        }
        .abi_encode();
        self.signer.send(self.address, data, U256::ZERO).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_liquidity_eth(
        &self,
        token:                Address,
        amount_token_desired: U256,
        amount_token_min:     U256,
        amount_eth_min:       U256,
        to:                   Address,
        deadline:             U256,
        value:                U256,
    ) -> Result<PendingTx<W>> {
        let data = IX1Router::addLiquidityETHCall {
            token,
            amountTokenDesired: amount_token_desired,
            amountTokenMin: amount_token_min,
            amountETHMin: amount_eth_min,
            to,
            deadline,
        }
        .abi_encode();
        self.signer.send(self.address, data, value).await
    }
}

// ─── ERC-20 ───────────────────────────────────────────────────────────────────

/// Signer-bound ERC-20 handle.
pub struct Erc20Contract<W> {
    address: Address,
    signer:  Signer<W>,
}

impl<W: WalletProvider> Erc20Contract<W> {
    pub fn new(address: Address, signer: Signer<W>) -> Self {
        Self { address, signer }
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let data = IERC20::allowanceCall { owner, spender }.abi_encode();
        let out = self.signer.call(self.address, data).await?;
        Ok(IERC20::allowanceCall::abi_decode_returns(&out)?)
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<PendingTx<W>> {
        debug!(token = %self.address, %spender, "approve");
        let data = IERC20::approveCall { spender, amount }.abi_encode();
        self.signer.send(self.address, data, U256::ZERO).await
    }
}
