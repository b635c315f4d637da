//! Static token registry.
//!
//! The list is fixed at startup (built-in defaults or the config file) and
//! never edited while a session runs.

use std::str::FromStr;

use alloy::primitives::Address;

use crate::error::{Error, Result};

/// One supported token.
///
/// The native asset is listed under its wrapped contract address, which is
/// what the router expects inside swap paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol:  String,
    pub name:    String,
    pub address: Address,
    pub native:  bool,
}

impl Token {
    pub fn new(symbol: &str, name: &str, address: Address, native: bool) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            address,
            native,
        }
    }

    /// Same on-chain identity (the only comparison quoting cares about).
    pub fn same_address(&self, other: &Token) -> bool {
        self.address == other.address
    }
}

/// Ordered list of supported tokens.
#[derive(Debug, Clone)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    /// Build a list, rejecting duplicates and more than one native entry.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        if tokens.len() < 2 {
            return Err(Error::Config("at least two tokens are required".into()));
        }
        if tokens.iter().filter(|t| t.native).count() > 1 {
            return Err(Error::Config("only one token may be marked native".into()));
        }
        for (i, t) in tokens.iter().enumerate() {
            for other in &tokens[i + 1..] {
                if t.address == other.address {
                    return Err(Error::Config(format!("duplicate token address {}", t.address)));
                }
                if t.symbol.eq_ignore_ascii_case(&other.symbol) {
                    return Err(Error::Config(format!("duplicate token symbol {}", t.symbol)));
                }
            }
        }
        Ok(Self { tokens })
    }

    /// Resolve a symbol (case-insensitive) or a listed `0x` address.
    pub fn resolve(&self, symbol_or_address: &str) -> Result<&Token> {
        if let Some(t) = self
            .tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol_or_address))
        {
            return Ok(t);
        }
        Address::from_str(symbol_or_address)
            .ok()
            .and_then(|addr| self.tokens.iter().find(|t| t.address == addr))
            .ok_or_else(|| Error::UnknownToken(symbol_or_address.to_string()))
    }

    pub fn native(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.native)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Initial (token_a, token_b) selection: first two entries.
    pub(crate) fn default_pair(&self) -> (Token, Token) {
        (self.tokens[0].clone(), self.tokens[1].clone())
    }

    /// Comma-separated symbols, for error hints.
    pub fn symbols(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
