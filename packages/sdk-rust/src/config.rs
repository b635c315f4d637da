//! Deployment configuration.
//!
//! Defaults describe the live X1 deployment; a TOML file may override any
//! field. Addresses stay strings until [`DexConfig::resolve`] validates them.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::tokens::{Token, TokenList};

// ─── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_ROUTER:         &str = "0xB0aA1d29339bdFaC68a791d4C13b0698A239D97C";
pub const DEFAULT_WRAPPED_NATIVE: &str = "0xc2F331332ca914685D773781744b1C589861C9Aa";
pub const DEFAULT_WALLET_URL:     &str = "http://127.0.0.1:1248";
/// Seconds added to "now" for every router deadline.
pub const DEFAULT_DEADLINE_SECS:  u64  = 1200;

// ─── File format ──────────────────────────────────────────────────────────────

/// Token entry as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub symbol:  String,
    #[serde(default)]
    pub name:    Option<String>,
    pub address: String,
    #[serde(default)]
    pub native:  bool,
}

/// Raw configuration, as loaded from TOML.
///
/// ```toml
/// router        = "0xB0aA1d29339bdFaC68a791d4C13b0698A239D97C"
/// wallet_url    = "http://127.0.0.1:1248"
/// deadline_secs = 1200
///
/// [[tokens]]
/// symbol  = "X1T"
/// address = "0xc2F331332ca914685D773781744b1C589861C9Aa"
/// native  = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    pub router:               String,
    pub wallet_url:           String,
    pub deadline_secs:        u64,
    pub confirm_poll_ms:      u64,
    pub confirm_timeout_secs: u64,
    pub tokens:               Vec<TokenEntry>,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            router:               DEFAULT_ROUTER.to_string(),
            wallet_url:           DEFAULT_WALLET_URL.to_string(),
            deadline_secs:        DEFAULT_DEADLINE_SECS,
            confirm_poll_ms:      1_000,
            confirm_timeout_secs: 300,
            tokens: vec![
                entry("X1T", "X1T (Native)", DEFAULT_WRAPPED_NATIVE, true),
                entry("TKA", "TKA", "0x6cF0576a5088ECE1cbc92cbDdD2496c8de5517FB", false),
                entry("TKB", "TKB", "0x2C71ab7D51251BADaE2729E3F842c43fc6BB68c5", false),
            ],
        }
    }
}

fn entry(symbol: &str, name: &str, address: &str, native: bool) -> TokenEntry {
    TokenEntry {
        symbol:  symbol.to_string(),
        name:    Some(name.to_string()),
        address: address.to_string(),
        native,
    }
}

impl DexConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Validate addresses and the token list.
    pub fn resolve(&self) -> Result<Deployment> {
        let router = parse_address("router", &self.router)?;
        let tokens = self
            .tokens
            .iter()
            .map(|t| {
                let address = parse_address(&t.symbol, &t.address)?;
                let name = t.name.clone().unwrap_or_else(|| t.symbol.clone());
                Ok(Token::new(&t.symbol, &name, address, t.native))
            })
            .collect::<Result<Vec<_>>>()?;
        if self.confirm_poll_ms == 0 {
            return Err(Error::Config("confirm_poll_ms must be > 0".into()));
        }
        Ok(Deployment {
            router,
            tokens:               TokenList::new(tokens)?,
            deadline:             Duration::from_secs(self.deadline_secs),
            confirm_poll:         Duration::from_millis(self.confirm_poll_ms),
            confirm_timeout:      Duration::from_secs(self.confirm_timeout_secs),
        })
    }
}

fn parse_address(field: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw.trim())
        .map_err(|_| Error::Config(format!("{field}: '{raw}' is not a valid address")))
}

// ─── Validated form ───────────────────────────────────────────────────────────

/// Validated configuration handed to a [`crate::SwapSession`].
#[derive(Debug, Clone)]
pub struct Deployment {
    pub router:          Address,
    pub tokens:          TokenList,
    pub deadline:        Duration,
    pub confirm_poll:    Duration,
    pub confirm_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_the_live_deployment() {
        let d = DexConfig::default().resolve().unwrap();
        assert_eq!(d.router, Address::from_str(DEFAULT_ROUTER).unwrap());
        assert_eq!(d.deadline, Duration::from_secs(1200));
        assert_eq!(d.tokens.len(), 3);
        let native = d.tokens.native().unwrap();
        assert_eq!(native.symbol, "X1T");
        assert_eq!(native.address, Address::from_str(DEFAULT_WRAPPED_NATIVE).unwrap());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = DexConfig::from_toml_str("deadline_secs = 60\n").unwrap();
        assert_eq!(cfg.deadline_secs, 60);
        assert_eq!(cfg.router, DEFAULT_ROUTER);
        assert_eq!(cfg.tokens.len(), 3);
    }

    #[test]
    fn custom_token_list_replaces_defaults() {
        let cfg = DexConfig::from_toml_str(
            r#"
            [[tokens]]
            symbol  = "ETH"
            address = "0x1111111111111111111111111111111111111111"
            native  = true

            [[tokens]]
            symbol  = "USD"
            address = "0x2222222222222222222222222222222222222222"
            "#,
        )
        .unwrap();
        let d = cfg.resolve().unwrap();
        assert_eq!(d.tokens.symbols(), "ETH, USD");
        assert_eq!(d.tokens.resolve("usd").unwrap().name, "USD");
    }

    #[test]
    fn bad_addresses_are_config_errors() {
        let cfg = DexConfig { router: "0x1234".into(), ..DexConfig::default() };
        assert!(matches!(cfg.resolve(), Err(Error::Config(_))));
    }
}
