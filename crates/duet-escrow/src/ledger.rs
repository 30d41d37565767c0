//! Ledger accounting
//!
//! `HeldTotal` tracks the sum of every balance currently escrowed by the
//! engine. Every fund-moving operation computes its updated total *before*
//! instructing the ledger submitter, then commits both in the same step, so
//! the total can never be observed half-applied.
//!
//! `LedgerSubmitter` is the collaborator boundary: the engine emits deposit
//! and payout instructions against a durable balance store and treats them as
//! fire-and-confirm. A refusal is a pre-mutation rejection.

use crate::engine::EscrowEngine;
use crate::error::EscrowResult;
use duet_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from held-total accounting.
///
/// These indicate a breached engine invariant rather than caller misuse;
/// the conservation property test exists to prove them unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccountingError {
    /// Crediting the held total overflowed.
    #[error("held total overflow: {held} + {delta}")]
    HeldOverflow {
        /// Current held total
        held: Amount,
        /// Credit that overflowed
        delta: Amount,
    },

    /// Debiting the held total would go below zero.
    #[error("held total underflow: {held} - {delta}")]
    HeldUnderflow {
        /// Current held total
        held: Amount,
        /// Debit that underflowed
        delta: Amount,
    },

    /// The ledger balance fell below the held total.
    #[error("ledger balance {balance} below held total {held}")]
    LedgerBehindHeld {
        /// Actual ledger balance
        balance: Amount,
        /// Held total the balance must cover
        held: Amount,
    },
}

/// The sum of every balance currently escrowed by the engine.
///
/// Updates are functional: `credited`/`debited` return the new total, which
/// the caller assigns only after the corresponding ledger instruction
/// succeeds. That keeps each operation's accounting a single atomic commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldTotal(Amount);

impl HeldTotal {
    /// An empty held total.
    pub const ZERO: HeldTotal = HeldTotal(Amount::ZERO);

    /// Current total.
    #[must_use]
    pub fn value(self) -> Amount {
        self.0
    }

    /// The total after escrowing `delta`.
    pub fn credited(self, delta: Amount) -> Result<HeldTotal, AccountingError> {
        self.0
            .checked_add(delta)
            .map(HeldTotal)
            .map_err(|_| AccountingError::HeldOverflow {
                held: self.0,
                delta,
            })
    }

    /// The total after disbursing `delta`.
    pub fn debited(self, delta: Amount) -> Result<HeldTotal, AccountingError> {
        self.0
            .checked_sub(delta)
            .map(HeldTotal)
            .map_err(|_| AccountingError::HeldUnderflow {
                held: self.0,
                delta,
            })
    }
}

/// Errors from the ledger submitter collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The paying account does not cover the requested deposit.
    #[error("insufficient funds: {account} has {available}, needs {requested}")]
    InsufficientFunds {
        /// The paying account
        account: AccountId,
        /// Amount requested
        requested: Amount,
        /// Amount available
        available: Amount,
    },

    /// The submitter refused the instruction.
    #[error("ledger rejected instruction: {reason}")]
    Rejected {
        /// Submitter-supplied reason
        reason: String,
    },
}

/// Boundary to the durable account ledger.
///
/// Implementations execute the engine's computed fund movements. `deposit`
/// pulls escrowed value out of a party's balance into the engine's pot;
/// `payout` disburses from the pot to a party. Both are synchronous and
/// confirmed in the same atomic step as the engine transition that issued
/// them.
pub trait LedgerSubmitter {
    /// Move `amount` from `from` into the escrow pot.
    fn deposit(&mut self, from: AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` from the escrow pot to `to`.
    fn payout(&mut self, to: AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Current balance of the escrow pot.
    fn escrow_balance(&self) -> Amount;
}

impl EscrowEngine {
    /// Sweep surplus pot balance to the treasury.
    ///
    /// The surplus is whatever the ledger holds beyond `total_held`; escrowed
    /// funds are never part of it. Administrator-only. Returns the swept
    /// amount, which may be zero.
    pub fn sweep(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        caller: AccountId,
    ) -> EscrowResult<Amount> {
        self.require_admin(caller)?;

        let balance = ledger.escrow_balance();
        let held = self.held.value();
        let surplus = balance
            .checked_sub(held)
            .map_err(|_| AccountingError::LedgerBehindHeld { balance, held })?;

        if !surplus.is_zero() {
            ledger.payout(self.config.treasury, surplus)?;
            tracing::info!("swept surplus {} to treasury", surplus);
        }
        Ok(surplus)
    }
}
