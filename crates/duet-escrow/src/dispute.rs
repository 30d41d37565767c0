//! Dispute resolution
//!
//! Either party of a booking can contest an attestation by escrowing a fixed
//! bond. The administrator adjudicates: upholding the attestation forfeits
//! the bond to the counterparty, overriding it returns the bond to the
//! challenger. If the administrator never acts, anyone can settle the dispute
//! after a timeout — the original outcome stands and the bond goes back to
//! the challenger with no penalty, because administrator inaction should not
//! cost the challenger.

use crate::attestation::Outcome;
use crate::booking::BookingStatus;
use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use crate::ledger::LedgerSubmitter;
use duet_core::{AccountId, Amount, BookingId, Timestamp};

impl EscrowEngine {
    /// Contest an attestation by escrowing the configured bond exactly.
    ///
    /// Only the booking's guest or the slot's host may challenge, and only
    /// while the booking is attested — once finalization runs, the window is
    /// closed for good.
    pub fn challenge(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        caller: AccountId,
        booking_id: BookingId,
        bond: Amount,
    ) -> EscrowResult<()> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        let slot = self
            .slots
            .get(&booking.slot_id)
            .ok_or(EscrowError::SlotNotFound(booking.slot_id))?;
        if caller != booking.guest && caller != slot.host {
            return Err(EscrowError::NotBookingParty { booking_id });
        }
        let (outcome, evidence) = match &booking.status {
            BookingStatus::Attested {
                outcome, evidence, ..
            } => (*outcome, evidence.clone()),
            other => {
                return Err(EscrowError::BookingNotAttested {
                    booking_id,
                    found: other.label(),
                })
            }
        };
        if bond != self.config.challenge_bond {
            return Err(EscrowError::BondMismatch {
                expected: self.config.challenge_bond,
                got: bond,
            });
        }

        let held = self.held.credited(bond)?;
        ledger.deposit(caller, bond)?;
        self.held = held;
        self.set_booking_status(
            booking_id,
            BookingStatus::Disputed {
                outcome,
                evidence,
                challenger: caller,
                bond,
                disputed_at: now,
            },
        );

        tracing::info!("{} challenged by {} with bond {}", booking_id, caller, bond);
        Ok(())
    }

    /// Administrator adjudication of a dispute.
    ///
    /// Confirming the original outcome forfeits the bond to the
    /// counterparty; overriding it returns the bond to the challenger.
    /// Either way the booking becomes immediately finalizable under the
    /// final outcome.
    pub fn resolve_dispute(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        caller: AccountId,
        booking_id: BookingId,
        final_outcome: Outcome,
    ) -> EscrowResult<()> {
        self.require_admin(caller)?;
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        let (original, challenger, bond) = match &booking.status {
            BookingStatus::Disputed {
                outcome,
                challenger,
                bond,
                ..
            } => (*outcome, *challenger, *bond),
            other => {
                return Err(EscrowError::BookingNotDisputed {
                    booking_id,
                    found: other.label(),
                })
            }
        };
        let guest = booking.guest;
        let slot = self
            .slots
            .get(&booking.slot_id)
            .ok_or(EscrowError::SlotNotFound(booking.slot_id))?;
        let host = slot.host;

        // Challenger loses the bond to the counterparty when the
        // administrator confirms the attested outcome.
        let bond_recipient = if final_outcome == original {
            if challenger == guest {
                host
            } else {
                guest
            }
        } else {
            challenger
        };

        let held = self.held.debited(bond)?;
        ledger.payout(bond_recipient, bond)?;
        self.held = held;
        self.set_booking_status(
            booking_id,
            BookingStatus::Resolved {
                outcome: final_outcome,
                finalizable_at: now,
            },
        );

        tracing::info!(
            "{} resolved to {}: bond {} paid to {}",
            booking_id,
            final_outcome,
            bond,
            bond_recipient
        );
        Ok(())
    }

    /// Settle a dispute the administrator never adjudicated.
    ///
    /// Callable by anyone once the dispute timeout has elapsed. Defaults to
    /// the original attested outcome and returns the bond to the challenger
    /// without penalty.
    pub fn finalize_dispute_by_timeout(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        booking_id: BookingId,
    ) -> EscrowResult<()> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        let (outcome, challenger, bond, disputed_at) = match &booking.status {
            BookingStatus::Disputed {
                outcome,
                challenger,
                bond,
                disputed_at,
                ..
            } => (*outcome, *challenger, *bond, *disputed_at),
            other => {
                return Err(EscrowError::BookingNotDisputed {
                    booking_id,
                    found: other.label(),
                })
            }
        };
        let resolvable_at = disputed_at.plus_secs(self.config.dispute_timeout_secs);
        if now < resolvable_at {
            return Err(EscrowError::DisputeTimeoutPending { now, resolvable_at });
        }

        let held = self.held.debited(bond)?;
        ledger.payout(challenger, bond)?;
        self.held = held;
        self.set_booking_status(
            booking_id,
            BookingStatus::Resolved {
                outcome,
                finalizable_at: now,
            },
        );

        tracing::info!(
            "{} dispute timed out: {} stands, bond returned to {}",
            booking_id,
            outcome,
            challenger
        );
        Ok(())
    }
}
