//! Session state container.
//!
//! All mutable session data lives in one [`SessionState`] value and changes
//! only through the transition methods below, none of which do I/O. The
//! controller in [`crate::client`] wraps it in a lock and performs the async
//! work between transitions.

use alloy::primitives::{Address, U256};

use crate::error::{Error, Result};
use crate::tokens::Token;
use crate::types::{ActionPhase, AmountB, Mode, SkipReason};
use crate::units;

// ─── Form ─────────────────────────────────────────────────────────────────────

/// The user's current inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub mode:     Mode,
    pub token_a:  Token,
    pub token_b:  Token,
    /// Raw decimal text; empty means "no amount".
    pub amount_a: String,
    pub amount_b: AmountB,
}

impl Form {
    pub fn new(token_a: Token, token_b: Token) -> Self {
        Self {
            mode: Mode::Swap,
            token_a,
            token_b,
            amount_a: String::new(),
            amount_b: AmountB::Empty,
        }
    }

    pub fn same_tokens(&self) -> bool {
        self.token_a.same_address(&self.token_b)
    }
}

// ─── Quote tickets ────────────────────────────────────────────────────────────

/// Monotonic id of a quote request; only the latest may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuoteTicket(u64);

/// A quote the controller should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub ticket:    QuoteTicket,
    pub amount_in: U256,
    pub path:      Vec<Address>,
}

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionState {
    form:      Form,
    account:   Option<Address>,
    quote_seq: u64,
    pending:   bool,
    phase:     ActionPhase,
}

impl SessionState {
    pub fn new(token_a: Token, token_b: Token) -> Self {
        Self {
            form:      Form::new(token_a, token_b),
            account:   None,
            quote_seq: 0,
            pending:   false,
            phase:     ActionPhase::Idle,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn mode(&self) -> Mode {
        self.form.mode
    }

    pub fn amount_b(&self) -> &AmountB {
        &self.form.amount_b
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    // ── Form transitions ─────────────────────────────────────────────────────

    /// Set the pay/first amount. Empty clears it.
    pub fn set_amount_a(&mut self, amount: &str) -> Result<()> {
        let amount = amount.trim();
        if !amount.is_empty() && !units::is_decimal(amount) {
            return Err(Error::InvalidAmount(amount.to_string()));
        }
        self.form.amount_a = amount.to_string();
        Ok(())
    }

    /// Set the second amount by hand. Only meaningful in liquidity mode; in
    /// swap mode the field is the quote.
    pub fn set_amount_b(&mut self, amount: &str) -> Result<()> {
        if self.form.mode != Mode::Liquidity {
            return Err(Error::InvalidArgument(
                "the receive amount is quoted in swap mode".into(),
            ));
        }
        let amount = amount.trim();
        if amount.is_empty() {
            self.form.amount_b = AmountB::Empty;
            return Ok(());
        }
        if !units::is_decimal(amount) {
            return Err(Error::InvalidAmount(amount.to_string()));
        }
        self.form.amount_b = AmountB::Value(amount.to_string());
        Ok(())
    }

    pub fn set_token_a(&mut self, token: Token) {
        self.form.token_a = token;
    }

    pub fn set_token_b(&mut self, token: Token) {
        self.form.token_b = token;
    }

    /// Swap the two token slots.
    pub fn flip_tokens(&mut self) {
        std::mem::swap(&mut self.form.token_a, &mut self.form.token_b);
    }

    /// Switch mode; the second amount is cleared on an actual change.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.form.mode != mode {
            self.form.mode = mode;
            self.form.amount_b = AmountB::Empty;
        }
    }

    pub fn set_account(&mut self, account: Address) {
        self.account = Some(account);
    }

    // ── Quote transitions ────────────────────────────────────────────────────

    /// Issue a new ticket and decide whether a quote must be fetched.
    ///
    /// The ticket is bumped even when nothing is fetched so an older
    /// in-flight response cannot overwrite the cleared field.
    pub fn begin_quote(&mut self, router_ready: bool) -> Option<QuoteRequest> {
        self.quote_seq += 1;
        let ticket = QuoteTicket(self.quote_seq);

        if self.form.mode != Mode::Swap {
            return None;
        }
        if !router_ready || self.form.amount_a.is_empty() || self.form.same_tokens() {
            self.form.amount_b = AmountB::Empty;
            return None;
        }
        match units::to_base_units(&self.form.amount_a) {
            Ok(amount_in) => Some(QuoteRequest {
                ticket,
                amount_in,
                path: vec![self.form.token_a.address, self.form.token_b.address],
            }),
            Err(_) => {
                self.form.amount_b = AmountB::NoPool;
                None
            }
        }
    }

    /// Apply a quote result if `ticket` is still the latest. Returns whether
    /// it was applied.
    pub fn apply_quote(&mut self, ticket: QuoteTicket, result: AmountB) -> bool {
        if ticket.0 != self.quote_seq || self.form.mode != Mode::Swap {
            return false;
        }
        self.form.amount_b = result;
        true
    }

    // ── Action transitions ───────────────────────────────────────────────────

    /// Claim the pending flag.
    pub fn try_begin_action(&mut self) -> std::result::Result<(), SkipReason> {
        if self.form.amount_a.is_empty() {
            return Err(SkipReason::NoAmount);
        }
        if self.pending {
            return Err(SkipReason::AlreadyPending);
        }
        self.pending = true;
        Ok(())
    }

    pub fn set_phase(&mut self, phase: ActionPhase) {
        self.phase = phase;
    }

    /// Release the pending flag and return to idle.
    pub fn finish_action(&mut self) {
        self.pending = false;
        self.phase = ActionPhase::Idle;
    }
}
