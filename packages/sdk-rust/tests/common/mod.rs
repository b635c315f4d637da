//! In-memory wallet that answers router / ERC-20 calls by selector.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use x1swap_sdk::contracts::{IX1Router, IERC20};
use x1swap_sdk::{
    Deployment, DexConfig, Error, Result, SwapSession, TxReceipt, TxRequest, WalletProvider,
};

pub const ONE: u128 = 1_000_000_000_000_000_000;

pub fn ether(n: u128) -> U256 {
    U256::from(n * ONE)
}

pub fn account() -> Address {
    Address::repeat_byte(0xaa)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RequestAccounts,
    Call { to: Address, selector: [u8; 4] },
    Send { to: Address, selector: [u8; 4], data: Bytes, value: U256, hash: TxHash },
    Receipt { hash: TxHash },
}

pub enum Quote {
    /// Return this array verbatim.
    Fixed(Vec<U256>),
    /// `[amountIn, amountIn * rate]`.
    Rate(u64),
    /// Revert as if no pair exists.
    Revert,
}

pub struct MockWallet {
    accounts:        Mutex<Vec<Address>>,
    reject_accounts: Mutex<bool>,
    quote:           Mutex<Quote>,
    allowance:       Mutex<U256>,
    reject_selector: Mutex<Option<[u8; 4]>>,
    revert_selector: Mutex<Option<[u8; 4]>>,
    quote_gates:     Mutex<VecDeque<oneshot::Receiver<()>>>,
    send_gates:      Mutex<VecDeque<oneshot::Receiver<()>>>,
    reverted:        Mutex<Vec<TxHash>>,
    events:          Mutex<Vec<Event>>,
    next_hash:       AtomicU8,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            accounts:        Mutex::new(vec![account()]),
            reject_accounts: Mutex::new(false),
            quote:           Mutex::new(Quote::Rate(2)),
            allowance:       Mutex::new(U256::ZERO),
            reject_selector: Mutex::new(None),
            revert_selector: Mutex::new(None),
            quote_gates:     Mutex::new(VecDeque::new()),
            send_gates:      Mutex::new(VecDeque::new()),
            reverted:        Mutex::new(Vec::new()),
            events:          Mutex::new(Vec::new()),
            next_hash:       AtomicU8::new(1),
        }
    }

    pub fn reject_accounts(&self) {
        *self.reject_accounts.lock() = true;
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock() = accounts;
    }

    pub fn set_quote(&self, quote: Quote) {
        *self.quote.lock() = quote;
    }

    pub fn set_allowance(&self, allowance: U256) {
        *self.allowance.lock() = allowance;
    }

    /// The user declines any transaction with this selector.
    pub fn reject_on(&self, selector: [u8; 4]) {
        *self.reject_selector.lock() = Some(selector);
    }

    /// Transactions with this selector are mined with status 0.
    pub fn revert_on(&self, selector: [u8; 4]) {
        *self.revert_selector.lock() = Some(selector);
    }

    /// The next quote blocks until the returned sender fires.
    pub fn hold_next_quote(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.quote_gates.lock().push_back(rx);
        tx
    }

    /// The next submission blocks until the returned sender fires.
    pub fn hold_next_send(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.send_gates.lock().push_back(rx);
        tx
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn sends(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Send { .. }))
            .collect()
    }

    pub fn quote_calls(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Call { selector, .. }
                if *selector == IX1Router::getAmountsOutCall::SELECTOR))
            .count()
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut s = [0u8; 4];
    s.copy_from_slice(&data[..4]);
    s
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.record(Event::RequestAccounts);
        if *self.reject_accounts.lock() {
            return Err(Error::UserRejected("User rejected the request.".into()));
        }
        Ok(self.accounts.lock().clone())
    }

    async fn call(&self, tx: &TxRequest) -> Result<Bytes> {
        let sel = selector(&tx.data);
        self.record(Event::Call { to: tx.to, selector: sel });

        if sel == IX1Router::getAmountsOutCall::SELECTOR {
            let gate = self.quote_gates.lock().pop_front();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let call = IX1Router::getAmountsOutCall::abi_decode(&tx.data)?;
            let amounts = match &*self.quote.lock() {
                Quote::Fixed(v) => v.clone(),
                Quote::Rate(r) => vec![call.amountIn, call.amountIn * U256::from(*r)],
                Quote::Revert => {
                    return Err(Error::Execution(
                        "execution reverted: UniswapV2Library: INSUFFICIENT_LIQUIDITY".into(),
                    ))
                }
            };
            return Ok(amounts.abi_encode().into());
        }
        if sel == IERC20::allowanceCall::SELECTOR {
            let allowance = *self.allowance.lock();
            return Ok(allowance.abi_encode().into());
        }
        Err(Error::Execution("unexpected call".into()))
    }

    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        let sel = selector(&tx.data);
        let gate = self.send_gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if *self.reject_selector.lock() == Some(sel) {
            return Err(Error::UserRejected("User denied transaction signature.".into()));
        }
        let hash = TxHash::with_last_byte(self.next_hash.fetch_add(1, Ordering::Relaxed));
        if *self.revert_selector.lock() == Some(sel) {
            self.reverted.lock().push(hash);
        }
        self.record(Event::Send {
            to: tx.to,
            selector: sel,
            data: tx.data.clone(),
            value: tx.value,
            hash,
        });
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>> {
        self.record(Event::Receipt { hash });
        let success = !self.reverted.lock().contains(&hash);
        Ok(Some(TxReceipt { hash, success, block_number: Some(7) }))
    }
}

pub fn deployment() -> Deployment {
    let config = DexConfig { confirm_poll_ms: 1, confirm_timeout_secs: 1, ..DexConfig::default() };
    config.resolve().expect("default config resolves")
}

pub fn session(wallet: &Arc<MockWallet>) -> SwapSession<MockWallet> {
    SwapSession::new(deployment(), Some(Arc::clone(wallet)))
}

/// A connected session with the event log cleared.
pub async fn connected() -> (Arc<MockWallet>, SwapSession<MockWallet>) {
    let wallet = Arc::new(MockWallet::new());
    let session = session(&wallet);
    session.connect().await.expect("mock wallet connects");
    wallet.clear_events();
    (wallet, session)
}

pub fn decode<C: SolCall>(data: &Bytes) -> C {
    C::abi_decode(data).expect("calldata decodes")
}

pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
