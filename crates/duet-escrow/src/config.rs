//! Engine configuration
//!
//! Set once at engine construction; the administrator may adjust the bond and
//! rate parameters at runtime through the setters in `admin`. Changes apply to
//! subsequent operations only — outstanding slots, bookings, and disputes keep
//! the values they snapshotted.

use crate::error::{EscrowError, EscrowResult};
use duet_core::{AccountId, Amount, BasisPoints};
use serde::{Deserialize, Serialize};

/// Static configuration for the escrow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Administrator account: dispute adjudication and config changes.
    pub admin: AccountId,
    /// Trusted attester account: session outcome reports.
    pub attester: AccountId,
    /// Treasury account: fees, penalties, and swept surplus.
    pub treasury: AccountId,
    /// Platform fee on session payouts, in basis points.
    pub fee_bps: BasisPoints,
    /// Penalty on late guest cancellation, in basis points.
    pub late_cancel_penalty_bps: BasisPoints,
    /// Fixed bond escrowed with every challenge.
    pub challenge_bond: Amount,
    /// How long an attestation stays contestable, in seconds.
    pub challenge_window_secs: u64,
    /// Grace buffer after session end before an unattested booking is
    /// claimable, in seconds.
    pub no_attest_buffer_secs: u64,
    /// How long a dispute waits for the administrator before timeout
    /// default, in seconds.
    pub dispute_timeout_secs: u64,
}

impl EscrowConfig {
    /// Validate the configuration invariants.
    ///
    /// Rates must lie in `[0, 10_000]` basis points; the bond and all three
    /// windows must be strictly positive.
    pub fn validate(&self) -> EscrowResult<()> {
        if !self.fee_bps.is_valid() {
            return Err(EscrowError::invalid_config(format!(
                "fee_bps {} exceeds 10000",
                self.fee_bps
            )));
        }
        if !self.late_cancel_penalty_bps.is_valid() {
            return Err(EscrowError::invalid_config(format!(
                "late_cancel_penalty_bps {} exceeds 10000",
                self.late_cancel_penalty_bps
            )));
        }
        if self.challenge_bond.is_zero() {
            return Err(EscrowError::invalid_config("challenge_bond must be > 0"));
        }
        if self.challenge_window_secs == 0 {
            return Err(EscrowError::invalid_config(
                "challenge_window_secs must be > 0",
            ));
        }
        if self.no_attest_buffer_secs == 0 {
            return Err(EscrowError::invalid_config(
                "no_attest_buffer_secs must be > 0",
            ));
        }
        if self.dispute_timeout_secs == 0 {
            return Err(EscrowError::invalid_config(
                "dispute_timeout_secs must be > 0",
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> EscrowResult<Self> {
        let config: EscrowConfig = toml::from_str(text)
            .map_err(|e| EscrowError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
