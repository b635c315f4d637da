//! X1-Swap Rust SDK
//!
//! Wallet session, quoting, and swap / liquidity client for the X1 router,
//! a Uniswap-V2-style contract on an EVM chain whose native asset is X1T.
//! Pricing and liquidity math stay on-chain; this crate sequences wallet
//! access, quotes, approvals and submissions around them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use x1swap_sdk::{ActionOutcome, DexConfig, RpcWallet, SwapSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config  = DexConfig::default();
//!     let wallet  = RpcWallet::detect(&config.wallet_url).await.map(Arc::new);
//!     let session = SwapSession::new(config.resolve()?, wallet);
//!
//!     // 1. Connect and quote 1 X1T -> TKA
//!     session.connect().await?;
//!     session.select_token_a("X1T").await?;
//!     session.select_token_b("TKA").await?;
//!     let quote = session.set_amount_a("1").await?;
//!     println!("You receive: {}", quote.display());
//!
//!     // 2. Execute
//!     match session.execute().await {
//!         ActionOutcome::Succeeded(r) => println!("Swapped! tx: {}", r.transaction),
//!         ActionOutcome::Failed(f)    => println!("{}", f.message),
//!         other                       => println!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`SwapSession::connect`] | Request wallet accounts, bind signer + router |
//! | [`SwapSession::refresh_quote`] | `getAmountsOut` for the current form, stale-safe |
//! | [`SwapSession::execute`] | Approve if needed, then swap or add liquidity |
//! | [`SwapSession::set_mode`] | Switch between swap and liquidity |
//!
//! # Known unsafe defaults
//!
//! * Every router call passes a zero minimum output ([`contracts::UNPROTECTED_MIN`]).
//! * Every token is scaled with 18 decimals ([`units::ASSUMED_DECIMALS`]).

pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod plan;
pub mod state;
pub mod tokens;
pub mod types;
pub mod units;
pub mod wallet;

pub use alloy::primitives::{Address, TxHash, U256};
pub use client::SwapSession;
pub use config::{Deployment, DexConfig};
pub use error::{Error, FailureKind, Result};
pub use tokens::{Token, TokenList};
pub use types::*;
pub use wallet::{RpcWallet, TxReceipt, TxRequest, WalletProvider};
