//! Wallet provider seam.
//!
//! [`WalletProvider`] is the EIP-1193 surface the session needs: account
//! access, read-only calls, transaction submission (the wallet signs), and
//! receipt lookup. [`RpcWallet`] speaks it over JSON-RPC/HTTP to a desktop
//! wallet or a dev node with unlocked accounts.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{hex, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

// ─── Wire types ───────────────────────────────────────────────────────────────

/// A call or transaction addressed to a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from:  Option<Address>,
    pub to:    Address,
    pub data:  Bytes,
    pub value: U256,
}

/// The subset of a receipt the session looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash:         TxHash,
    pub success:      bool,
    pub block_number: Option<u64>,
}

// ─── Provider trait ───────────────────────────────────────────────────────────

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`; may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// `eth_call` against the latest block.
    async fn call(&self, tx: &TxRequest) -> Result<Bytes>;

    /// `eth_sendTransaction`; the wallet signs and broadcasts.
    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash>;

    /// `eth_getTransactionReceipt`; `None` while pending.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>>;
}

// ─── Account-bound signer ─────────────────────────────────────────────────────

/// A provider bound to one granted account.
pub struct Signer<W> {
    wallet:  Arc<W>,
    account: Address,
    poll:    Duration,
    timeout: Duration,
}

impl<W> Clone for Signer<W> {
    fn clone(&self) -> Self {
        Self {
            wallet:  Arc::clone(&self.wallet),
            account: self.account,
            poll:    self.poll,
            timeout: self.timeout,
        }
    }
}

impl<W: WalletProvider> Signer<W> {
    pub fn new(wallet: Arc<W>, account: Address, poll: Duration, timeout: Duration) -> Self {
        Self { wallet, account, poll, timeout }
    }

    pub fn address(&self) -> Address {
        self.account
    }

    pub async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        let tx = TxRequest { from: Some(self.account), to, data: data.into(), value: U256::ZERO };
        self.wallet.call(&tx).await
    }

    pub async fn send(&self, to: Address, data: Vec<u8>, value: U256) -> Result<PendingTx<W>> {
        let tx = TxRequest { from: Some(self.account), to, data: data.into(), value };
        let hash = self.wallet.send_transaction(&tx).await?;
        info!(%hash, %to, %value, "transaction submitted");
        Ok(PendingTx {
            hash,
            wallet:  Arc::clone(&self.wallet),
            poll:    self.poll,
            timeout: self.timeout,
        })
    }
}

/// A submitted transaction awaiting confirmation.
pub struct PendingTx<W> {
    hash:    TxHash,
    wallet:  Arc<W>,
    poll:    Duration,
    timeout: Duration,
}

impl<W: WalletProvider> PendingTx<W> {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Poll for the receipt until it lands or the timeout elapses.
    ///
    /// A mined receipt with status 0 is [`Error::Reverted`].
    pub async fn wait(self) -> Result<TxReceipt> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(receipt) = self.wallet.transaction_receipt(self.hash).await? {
                if !receipt.success {
                    warn!(hash = %self.hash, "transaction reverted");
                    return Err(Error::Reverted(self.hash));
                }
                info!(hash = %self.hash, block = ?receipt.block_number, "transaction confirmed");
                return Ok(receipt);
            }
            if started.elapsed() >= self.timeout {
                return Err(Error::ConfirmationTimeout(self.hash));
            }
            tokio::time::sleep(self.poll).await;
        }
    }
}

// ─── JSON-RPC wallet ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error:  Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code:    i64,
    message: String,
}

/// EIP-1193 wallet reached over JSON-RPC/HTTP.
pub struct RpcWallet {
    url:     String,
    http:    reqwest::Client,
    next_id: AtomicU64,
}

impl RpcWallet {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { url: url.into(), http, next_id: AtomicU64::new(1) })
    }

    /// Probe the endpoint with `eth_chainId`; `None` when nothing answers.
    ///
    /// This is the "is a wallet installed" check: an unreachable endpoint is
    /// treated like a browser without the extension.
    pub async fn detect(url: &str) -> Option<Self> {
        let wallet = Self::new(url).ok()?;
        match wallet.chain_id().await {
            Ok(chain_id) => {
                info!(url, chain_id, "wallet provider detected");
                Some(wallet)
            }
            Err(e) => {
                warn!(url, error = %e, "no wallet provider at endpoint");
                None
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let raw = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "wallet rpc");
        let body = json!({
            "jsonrpc": "2.0",
            "method":  method,
            "params":  params,
            "id":      id,
        });
        let resp: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.error {
            return Err(Error::from_rpc(err.code, err.message));
        }
        resp.result
            .ok_or_else(|| Error::MalformedResponse(format!("{method}: missing 'result'")))
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let raw = self.request("eth_requestAccounts", json!([])).await?;
        let list = raw
            .as_array()
            .ok_or_else(|| Error::MalformedResponse("accounts is not an array".into()))?;
        list.iter()
            .map(|v| {
                v.as_str()
                    .and_then(|s| Address::from_str(s).ok())
                    .ok_or_else(|| Error::MalformedResponse(format!("bad account {v}")))
            })
            .collect()
    }

    async fn call(&self, tx: &TxRequest) -> Result<Bytes> {
        let raw = self.request("eth_call", json!([tx_json(tx), "latest"])).await?;
        parse_bytes(&raw)
    }

    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        let raw = self.request("eth_sendTransaction", json!([tx_json(tx)])).await?;
        raw.as_str()
            .and_then(|s| TxHash::from_str(s).ok())
            .ok_or_else(|| Error::MalformedResponse(format!("bad transaction hash {raw}")))
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>> {
        let raw = self
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        parse_receipt(hash, &raw).map(Some)
    }
}

// ─── JSON helpers ─────────────────────────────────────────────────────────────

fn tx_json(tx: &TxRequest) -> Value {
    let mut obj = json!({
        "to":    tx.to.to_string(),
        "data":  hex::encode_prefixed(&tx.data),
        "value": format!("{:#x}", tx.value),
    });
    if let Some(from) = tx.from {
        obj["from"] = json!(from.to_string());
    }
    obj
}

fn parse_quantity(v: &Value) -> Result<u64> {
    let s = v
        .as_str()
        .ok_or_else(|| Error::MalformedResponse(format!("expected hex quantity, got {v}")))?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| Error::MalformedResponse(format!("quantity {s}: {e}")))
}

fn parse_bytes(v: &Value) -> Result<Bytes> {
    let s = v
        .as_str()
        .ok_or_else(|| Error::MalformedResponse(format!("expected hex data, got {v}")))?;
    hex::decode(s.trim_start_matches("0x"))
        .map(Bytes::from)
        .map_err(|e| Error::MalformedResponse(format!("data {s}: {e}")))
}

fn parse_receipt(hash: TxHash, v: &Value) -> Result<TxReceipt> {
    // Pre-Byzantium receipts carry no status; treat them as successful.
    let success = match v.get("status") {
        Some(status) if !status.is_null() => parse_quantity(status)? == 1,
        _ => true,
    };
    let block_number = match v.get("blockNumber") {
        Some(n) if !n.is_null() => Some(parse_quantity(n)?),
        _ => None,
    };
    Ok(TxReceipt { hash, success, block_number })
}
