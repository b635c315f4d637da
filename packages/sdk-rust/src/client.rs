//! [`SwapSession`], the swap session controller.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::Deployment,
    contracts::{Erc20Contract, RouterContract, UNLIMITED_ALLOWANCE, UNPROTECTED_MIN},
    error::{Error, Result},
    plan::{Approval, RouterCall},
    state::SessionState,
    tokens::TokenList,
    types::{ActionOutcome, ActionPhase, ActionReceipt, AmountB, Mode},
    units,
    wallet::{Signer, WalletProvider},
};

// ─── Connection ───────────────────────────────────────────────────────────────

/// Provider, signer and router for one connected account. Replaced as a
/// whole on every (re)connect.
struct Connection<W> {
    account: Address,
    signer:  Signer<W>,
    router:  RouterContract<W>,
}

impl<W> Clone for Connection<W> {
    fn clone(&self) -> Self {
        Self {
            account: self.account,
            signer:  self.signer.clone(),
            router:  self.router.clone(),
        }
    }
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Async swap session.
///
/// Form setters re-run the quote; [`execute`](Self::execute) performs the
/// swap or liquidity add for the current form.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use x1swap_sdk::{DexConfig, RpcWallet, SwapSession};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config  = DexConfig::default();
/// let wallet  = RpcWallet::detect(&config.wallet_url).await.map(Arc::new);
/// let session = SwapSession::new(config.resolve()?, wallet);
///
/// session.connect().await?;
/// session.select_token_b("TKA").await?;
/// let quote = session.set_amount_a("1").await?;
/// println!("receive: {}", quote.display());
/// # Ok(())
/// # }
/// ```
pub struct SwapSession<W> {
    deployment: Deployment,
    wallet:     Option<Arc<W>>,
    state:      Mutex<SessionState>,
    connection: Mutex<Option<Connection<W>>>,
}

impl<W: WalletProvider> SwapSession<W> {
    /// `wallet = None` models a browser without the wallet extension.
    pub fn new(deployment: Deployment, wallet: Option<Arc<W>>) -> Self {
        let (token_a, token_b) = deployment.tokens.default_pair();
        Self {
            state: Mutex::new(SessionState::new(token_a, token_b)),
            deployment,
            wallet,
            connection: Mutex::new(None),
        }
    }

    pub fn tokens(&self) -> &TokenList {
        &self.deployment.tokens
    }

    pub fn router(&self) -> Address {
        self.deployment.router
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.state.lock().account()
    }

    // ── Wallet connector ──────────────────────────────────────────────────────

    /// Connect the wallet, then re-quote against the new router handle.
    pub async fn connect(&self) -> Result<Address> {
        let account = self.establish().await?;
        self.refresh_quote().await;
        Ok(account)
    }

    /// Request accounts and rebuild signer + router for the first one.
    async fn establish(&self) -> Result<Address> {
        let wallet = self.wallet.clone().ok_or(Error::WalletNotInstalled)?;
        info!("requesting wallet accounts");
        let accounts = wallet.request_accounts().await?;
        let account = *accounts.first().ok_or(Error::NoAccounts)?;

        let signer = Signer::new(
            wallet,
            account,
            self.deployment.confirm_poll,
            self.deployment.confirm_timeout,
        );
        let router = RouterContract::new(self.deployment.router, signer.clone());
        *self.connection.lock() = Some(Connection { account, signer, router });
        self.state.lock().set_account(account);
        info!(%account, "wallet connected");
        Ok(account)
    }

    // ── Form ──────────────────────────────────────────────────────────────────

    pub async fn set_amount_a(&self, amount: &str) -> Result<AmountB> {
        self.state.lock().set_amount_a(amount)?;
        Ok(self.refresh_quote().await)
    }

    /// Liquidity mode only.
    pub fn set_amount_b(&self, amount: &str) -> Result<()> {
        self.state.lock().set_amount_b(amount)
    }

    pub async fn select_token_a(&self, symbol_or_address: &str) -> Result<AmountB> {
        let token = self.deployment.tokens.resolve(symbol_or_address)?.clone();
        self.state.lock().set_token_a(token);
        Ok(self.refresh_quote().await)
    }

    pub async fn select_token_b(&self, symbol_or_address: &str) -> Result<AmountB> {
        let token = self.deployment.tokens.resolve(symbol_or_address)?.clone();
        self.state.lock().set_token_b(token);
        Ok(self.refresh_quote().await)
    }

    pub async fn flip_tokens(&self) -> AmountB {
        self.state.lock().flip_tokens();
        self.refresh_quote().await
    }

    pub async fn set_mode(&self, mode: Mode) -> AmountB {
        self.state.lock().set_mode(mode);
        self.refresh_quote().await
    }

    // ── Quote refresher ───────────────────────────────────────────────────────

    /// Re-quote the current form and return the resulting second amount.
    ///
    /// Router failures become [`AmountB::NoPool`]. A response that arrives
    /// after a newer refresh started is dropped.
    pub async fn refresh_quote(&self) -> AmountB {
        let router = self.connection.lock().as_ref().map(|c| c.router.clone());
        let request = self.state.lock().begin_quote(router.is_some());
        let (Some(request), Some(router)) = (request, router) else {
            return self.state.lock().amount_b().clone();
        };

        let result = match router.get_amounts_out(request.amount_in, request.path).await {
            Ok(amounts) => match amounts.get(1) {
                Some(out) => AmountB::Value(units::to_display(*out)),
                None => AmountB::NoPool,
            },
            Err(e) => {
                debug!(error = %e, "quote failed");
                AmountB::NoPool
            }
        };

        let mut state = self.state.lock();
        if !state.apply_quote(request.ticket, result) {
            debug!(ticket = ?request.ticket, "discarding stale quote");
        }
        state.amount_b().clone()
    }

    // ── Action executor ───────────────────────────────────────────────────────

    /// Swap or add liquidity for the current form.
    ///
    /// Without a connected wallet this connects instead and makes no
    /// approval or transaction; the quote is refreshed for the new router
    /// once the pending flag is released. The flag is released on every path.
    pub async fn execute(&self) -> ActionOutcome {
        let outcome = self.execute_guarded().await;
        if let ActionOutcome::Connected(_) = outcome {
            self.refresh_quote().await;
        }
        outcome
    }

    async fn execute_guarded(&self) -> ActionOutcome {
        if let Err(reason) = self.state.lock().try_begin_action() {
            debug!(?reason, "action skipped");
            return ActionOutcome::Skipped(reason);
        }
        let _pending = PendingGuard { state: &self.state };

        let connection = self.connection.lock().clone();
        let Some(connection) = connection else {
            self.state.lock().set_phase(ActionPhase::Connecting);
            return match self.establish().await {
                Ok(account) => ActionOutcome::Connected(account),
                Err(e) => {
                    warn!(error = %e, "connect failed");
                    ActionOutcome::Failed(e.into())
                }
            };
        };

        match self.run_action(&connection).await {
            Ok(receipt) => {
                info!(tx = %receipt.transaction, mode = ?receipt.mode, "action confirmed");
                ActionOutcome::Succeeded(receipt)
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "action failed");
                ActionOutcome::Failed(e.into())
            }
        }
    }

    async fn run_action(&self, connection: &Connection<W>) -> Result<ActionReceipt> {
        let form = self.state.lock().form().clone();
        let plan = form.plan()?;
        let deadline = deadline_from_now(self.deployment.deadline.as_secs());
        let to = connection.account;

        let approval = match &plan.approval {
            Some(need) => {
                self.state.lock().set_phase(ActionPhase::Approving);
                self.ensure_allowance(connection, need).await?
            }
            None => None,
        };

        self.state.lock().set_phase(ActionPhase::Submitting);
        let router = &connection.router;
        let pending = match plan.call {
            RouterCall::SwapExactEthForTokens { path, value } => {
                router
                    .swap_exact_eth_for_tokens(UNPROTECTED_MIN, path, to, deadline, value)
                    .await?
            }
            RouterCall::SwapExactTokensForEth { amount_in, path } => {
                router
                    .swap_exact_tokens_for_eth(amount_in, UNPROTECTED_MIN, path, to, deadline)
                    .await?
            }
            RouterCall::AddLiquidityEth { token, amount_token, amount_native } => {
                router
                    .add_liquidity_eth(
                        token,
                        amount_token,
                        UNPROTECTED_MIN,
                        UNPROTECTED_MIN,
                        to,
                        deadline,
                        amount_native,
                    )
                    .await?
            }
        };

        self.state.lock().set_phase(ActionPhase::Confirming);
        let receipt = pending.wait().await?;
        Ok(ActionReceipt {
            mode: form.mode,
            approval,
            transaction: receipt.hash,
            block_number: receipt.block_number,
        })
    }

    /// Approve the router for an unlimited amount if the current allowance
    /// is short, waiting for the approval to confirm.
    async fn ensure_allowance(
        &self,
        connection: &Connection<W>,
        need:       &Approval,
    ) -> Result<Option<TxHash>> {
        let token = Erc20Contract::new(need.token, connection.signer.clone());
        let allowance = token.allowance(connection.account, self.deployment.router).await?;
        if allowance >= need.amount {
            debug!(token = %need.token, %allowance, "allowance sufficient");
            return Ok(None);
        }
        info!(token = %need.token, %allowance, needed = %need.amount, "approving router");
        let receipt = token
            .approve(self.deployment.router, UNLIMITED_ALLOWANCE)
            .await?
            .wait()
            .await?;
        Ok(Some(receipt.hash))
    }
}

// ─── Utilities ────────────────────────────────────────────────────────────────

/// Clears the pending flag when the executor returns, whichever way.
struct PendingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().finish_action();
    }
}

/// Unix seconds `secs` from now, as the router's `deadline` argument.
fn deadline_from_now(secs: u64) -> U256 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    U256::from(now.saturating_add(secs))
}
