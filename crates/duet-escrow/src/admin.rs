//! Administrator configuration setters
//!
//! The administrator may adjust the bond and rate parameters at runtime.
//! Changes apply to subsequent operations only: slots keep their price
//! snapshots and open disputes keep the bond they escrowed.

use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use duet_core::{AccountId, Amount, BasisPoints};

impl EscrowEngine {
    /// Set the bond required for future challenges.
    pub fn set_challenge_bond(&mut self, caller: AccountId, bond: Amount) -> EscrowResult<()> {
        self.require_admin(caller)?;
        if bond.is_zero() {
            return Err(EscrowError::invalid_config("challenge_bond must be > 0"));
        }
        self.config.challenge_bond = bond;
        tracing::debug!("challenge bond set to {}", bond);
        Ok(())
    }

    /// Set the platform fee for future settlements.
    pub fn set_fee_bps(&mut self, caller: AccountId, fee_bps: BasisPoints) -> EscrowResult<()> {
        self.require_admin(caller)?;
        if !fee_bps.is_valid() {
            return Err(EscrowError::invalid_config(format!(
                "fee_bps {fee_bps} exceeds 10000"
            )));
        }
        self.config.fee_bps = fee_bps;
        tracing::debug!("fee set to {}", fee_bps);
        Ok(())
    }

    /// Set the late-cancellation penalty for future cancellations.
    pub fn set_late_cancel_penalty_bps(
        &mut self,
        caller: AccountId,
        penalty_bps: BasisPoints,
    ) -> EscrowResult<()> {
        self.require_admin(caller)?;
        if !penalty_bps.is_valid() {
            return Err(EscrowError::invalid_config(format!(
                "late_cancel_penalty_bps {penalty_bps} exceeds 10000"
            )));
        }
        self.config.late_cancel_penalty_bps = penalty_bps;
        tracing::debug!("late cancel penalty set to {}", penalty_bps);
        Ok(())
    }
}
