//! Fixed-point conversion between display strings and on-chain units.
//!
//! Every token is scaled with [`ASSUMED_DECIMALS`]. That matches the native
//! asset and most ERC-20s but mis-scales tokens with a different `decimals()`.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

use crate::error::{Error, Result};

/// Decimals used for every token. Unsafe for non-18-decimal tokens.
pub const ASSUMED_DECIMALS: u8 = 18;

/// `true` for strings like `"1"`, `"0.5"`, `".25"`, `"10."`.
pub fn is_decimal(amount: &str) -> bool {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in amount.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Scale a display amount into base units (`"1"` → `1e18`).
pub fn to_base_units(amount: &str) -> Result<U256> {
    let trimmed = amount.trim();
    if !is_decimal(trimmed) {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    let normalized = match (trimmed.starts_with('.'), trimmed.ends_with('.')) {
        (true, _) => format!("0{trimmed}"),
        (_, true) => format!("{trimmed}0"),
        _ => trimmed.to_string(),
    };
    parse_units(&normalized, ASSUMED_DECIMALS)
        .map(|parsed| parsed.get_absolute())
        .map_err(|_| Error::InvalidAmount(amount.to_string()))
}

/// Render base units for display, without trailing zeros (`2e18` → `"2"`).
pub fn to_display(amount: U256) -> String {
    let formatted = match format_units(amount, ASSUMED_DECIMALS) {
        Ok(s) => s,
        Err(_) => return amount.to_string(),
    };
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
