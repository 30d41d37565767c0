//! Booking lifecycle
//!
//! Guest reservation of a slot, escrow of the exact slot price, and the
//! early-vs-late cancellation economics. A booking is terminal once
//! `Finalized`; the status enum carries the stage-specific data so an
//! attested outcome, a dispute's challenger, or a pending finalization
//! deadline cannot exist in the wrong stage.

use crate::attestation::Outcome;
use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use crate::ledger::LedgerSubmitter;
use crate::slot::SlotStatus;
use duet_core::{AccountId, Amount, BookingId, EvidenceRef, SlotId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking, with stage-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Reserved and escrowed; no outcome reported yet.
    Booked,
    /// The attester reported an outcome; contestable until the challenge
    /// window closes.
    Attested {
        /// Reported session outcome.
        outcome: Outcome,
        /// Opaque evidence reference handed over by the attester.
        evidence: EvidenceRef,
        /// When the booking becomes finalizable.
        finalizable_at: Timestamp,
    },
    /// A party bonded a challenge against the attestation.
    Disputed {
        /// The originally attested outcome.
        outcome: Outcome,
        /// Evidence reference from the contested attestation.
        evidence: EvidenceRef,
        /// The party that posted the bond.
        challenger: AccountId,
        /// Bond escrowed at challenge time (the configured bond may change
        /// afterwards; this one is what gets redistributed).
        bond: Amount,
        /// When the challenge was posted.
        disputed_at: Timestamp,
    },
    /// The dispute settled (adjudication or timeout default); awaiting
    /// finalization.
    Resolved {
        /// The effective outcome payouts will follow.
        outcome: Outcome,
        /// When the booking becomes finalizable (immediately on resolution).
        finalizable_at: Timestamp,
    },
    /// Funds disbursed. Terminal: no further mutation.
    Finalized,
}

impl BookingStatus {
    /// Short status label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Attested { .. } => "attested",
            BookingStatus::Disputed { .. } => "disputed",
            BookingStatus::Resolved { .. } => "resolved",
            BookingStatus::Finalized => "finalized",
        }
    }

    /// Whether this booking can never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Finalized)
    }
}

/// A guest's paid reservation of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier.
    pub id: BookingId,
    /// The reserved slot.
    pub slot_id: SlotId,
    /// The paying guest.
    pub guest: AccountId,
    /// Escrowed amount; immutable once escrowed.
    pub amount: Amount,
    /// Current lifecycle status.
    pub status: BookingStatus,
}

impl EscrowEngine {
    /// Reserve an open slot by escrowing exactly its snapshot price.
    pub fn book(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        guest: AccountId,
        slot_id: SlotId,
        payment: Amount,
    ) -> EscrowResult<BookingId> {
        let slot = self
            .slots
            .get(&slot_id)
            .ok_or(EscrowError::SlotNotFound(slot_id))?;
        if slot.status != SlotStatus::Open {
            return Err(EscrowError::SlotNotOpen {
                slot_id,
                found: slot.status.label(),
            });
        }
        if payment != slot.price {
            return Err(EscrowError::PaymentMismatch {
                expected: slot.price,
                got: payment,
            });
        }

        let held = self.held.credited(payment)?;
        ledger.deposit(guest, payment)?;
        self.held = held;

        let booking_id = self.alloc_booking_id();
        self.bookings.insert(
            booking_id,
            Booking {
                id: booking_id,
                slot_id,
                guest,
                amount: payment,
                status: BookingStatus::Booked,
            },
        );
        if let Some(slot) = self.slots.get_mut(&slot_id) {
            slot.status = SlotStatus::Booked;
        }

        tracing::info!("{} booked {} for {}", guest, slot_id, payment);
        Ok(booking_id)
    }

    /// Guest cancellation, with early-vs-late economics.
    ///
    /// Before the slot's cutoff the guest is refunded in full and the slot
    /// reopens. At or past the cutoff the penalty and platform fee are
    /// carved out, the host is paid the remainder, and the slot settles.
    pub fn cancel_booking_as_guest(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        guest: AccountId,
        booking_id: BookingId,
    ) -> EscrowResult<()> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        if booking.guest != guest {
            return Err(EscrowError::NotBookingGuest { booking_id });
        }
        if booking.status != BookingStatus::Booked {
            return Err(EscrowError::BookingNotBooked {
                booking_id,
                found: booking.status.label(),
            });
        }
        let amount = booking.amount;
        let slot_id = booking.slot_id;
        let slot = self
            .slots
            .get(&slot_id)
            .ok_or(EscrowError::SlotNotFound(slot_id))?;
        let host = slot.host;
        let cutoff = slot.cancel_cutoff();

        let held = self.held.debited(amount)?;

        if now < cutoff {
            // Early: full refund, slot reopens for a new guest.
            ledger.payout(guest, amount)?;
            self.held = held;
            self.set_slot_status(slot_id, SlotStatus::Open);
            self.set_booking_finalized(booking_id);
            tracing::info!("{} cancelled early by guest, {} refunded", booking_id, amount);
        } else {
            // Late: penalty to the treasury, fee on the host's gross.
            let penalty = amount.bps_share(self.config.late_cancel_penalty_bps);
            let host_gross = amount.checked_sub(penalty)?;
            let fee = host_gross.bps_share(self.config.fee_bps);
            let host_net = host_gross.checked_sub(fee)?;
            let treasury_cut = penalty.checked_add(fee)?;

            if !host_net.is_zero() {
                ledger.payout(host, host_net)?;
            }
            if !treasury_cut.is_zero() {
                ledger.payout(self.config.treasury, treasury_cut)?;
            }
            self.held = held;
            self.set_slot_status(slot_id, SlotStatus::Settled);
            self.set_booking_finalized(booking_id);
            tracing::info!(
                "{} cancelled late by guest: host {}, treasury {}",
                booking_id,
                host_net,
                treasury_cut
            );
        }
        Ok(())
    }

    /// Host cancellation: always a full refund to the guest.
    ///
    /// Valid only before any attestation; after that the dispute procedure
    /// is the remedy.
    pub fn cancel_booking_as_host(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        host: AccountId,
        booking_id: BookingId,
    ) -> EscrowResult<()> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        let slot_id = booking.slot_id;
        let slot = self
            .slots
            .get(&slot_id)
            .ok_or(EscrowError::SlotNotFound(slot_id))?;
        if slot.host != host {
            return Err(EscrowError::NotSlotHost { slot_id });
        }
        if booking.status != BookingStatus::Booked {
            return Err(EscrowError::BookingNotBooked {
                booking_id,
                found: booking.status.label(),
            });
        }
        let guest = booking.guest;
        let amount = booking.amount;

        let held = self.held.debited(amount)?;
        ledger.payout(guest, amount)?;
        self.held = held;
        self.set_slot_status(slot_id, SlotStatus::Cancelled);
        self.set_booking_finalized(booking_id);

        tracing::info!("{} cancelled by host, {} refunded to {}", booking_id, amount, guest);
        Ok(())
    }
}
