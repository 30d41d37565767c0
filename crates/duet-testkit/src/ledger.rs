//! In-memory ledger submitter
//!
//! A deterministic stand-in for the durable account ledger: per-account
//! balances, an escrow pot, and a log of every executed instruction so tests
//! can assert on exactly what the engine told the ledger to do.

use duet_core::{AccountId, Amount};
use duet_escrow::{LedgerError, LedgerSubmitter};
use std::collections::BTreeMap;

/// One executed fund-movement instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Party balance moved into the escrow pot.
    Deposit {
        /// The paying account
        from: AccountId,
        /// Amount moved
        amount: Amount,
    },
    /// Escrow pot balance paid out to a party.
    Payout {
        /// The receiving account
        to: AccountId,
        /// Amount moved
        amount: Amount,
    },
}

/// In-memory [`LedgerSubmitter`] with funded accounts and an instruction log.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: BTreeMap<AccountId, Amount>,
    pot: Amount,
    log: Vec<Transfer>,
}

impl MemoryLedger {
    /// An empty ledger with no funded accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account balance out of thin air (test setup only).
    pub fn fund(&mut self, account: AccountId, amount: Amount) {
        let balance = self.accounts.entry(account).or_default();
        *balance = balance.checked_add(amount).expect("test funding overflow");
    }

    /// A party's current balance.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.accounts.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Every instruction executed so far, in order.
    pub fn transfers(&self) -> &[Transfer] {
        &self.log
    }

    /// Drop funds directly into the pot, bypassing the engine's accounting.
    ///
    /// Simulates outside value arriving on the escrow account (the surplus
    /// that `sweep` recovers).
    pub fn donate_to_pot(&mut self, amount: Amount) {
        self.pot = self.pot.checked_add(amount).expect("test donation overflow");
    }
}

impl LedgerSubmitter for MemoryLedger {
    fn deposit(&mut self, from: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(&from);
        let remaining = available
            .checked_sub(amount)
            .map_err(|_| LedgerError::InsufficientFunds {
                account: from,
                requested: amount,
                available,
            })?;
        self.accounts.insert(from, remaining);
        self.pot = self
            .pot
            .checked_add(amount)
            .map_err(|_| LedgerError::Rejected {
                reason: "escrow pot overflow".to_string(),
            })?;
        self.log.push(Transfer::Deposit { from, amount });
        Ok(())
    }

    fn payout(&mut self, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let pot = self.pot;
        self.pot = pot
            .checked_sub(amount)
            .map_err(|_| LedgerError::InsufficientFunds {
                account: to,
                requested: amount,
                available: pot,
            })?;
        let balance = self.balance_of(&to);
        let balance = balance
            .checked_add(amount)
            .map_err(|_| LedgerError::Rejected {
                reason: "account balance overflow".to_string(),
            })?;
        self.accounts.insert(to, balance);
        self.log.push(Transfer::Payout { to, amount });
        Ok(())
    }

    fn escrow_balance(&self) -> Amount {
        self.pot
    }
}
