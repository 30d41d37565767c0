//! Attestation and finalization
//!
//! The trusted attester reports whether a session happened, inside an
//! outcome-specific timing window. An uncontested attestation becomes
//! finalizable once the challenge window lapses; finalization computes the
//! payout from the effective outcome and settles the slot. Bookings that
//! never receive an attestation can be unwound by either party after a grace
//! buffer.

use crate::booking::BookingStatus;
use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use crate::ledger::LedgerSubmitter;
use crate::slot::SlotStatus;
use duet_core::{AccountId, BookingId, EvidenceRef, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long after the scheduled session end a `Completed` attestation is
/// still accepted: two hours, in seconds.
pub const COMPLETED_ATTEST_SLACK_SECS: u64 = 7_200;

/// Session outcome vocabulary shared by the attester and the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The session took place.
    Completed,
    /// The host never showed; the guest is made whole.
    NoShowHost,
    /// The guest never showed; the host is paid out.
    NoShowGuest,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Completed => "completed",
            Outcome::NoShowHost => "no-show-host",
            Outcome::NoShowGuest => "no-show-guest",
        };
        write!(f, "{label}")
    }
}

impl EscrowEngine {
    /// Record the attester's outcome for a booked session.
    ///
    /// `Completed` is accepted from the minimum-overlap mark until two hours
    /// past the scheduled end. No-show outcomes are accepted from the end of
    /// the grace period for one session-length afterwards. Each bound has its
    /// own rejection so callers can tell "too early" from "too late".
    pub fn attest(
        &mut self,
        now: Timestamp,
        attester: AccountId,
        booking_id: BookingId,
        outcome: Outcome,
        evidence: EvidenceRef,
    ) -> EscrowResult<()> {
        if attester != self.config.attester {
            return Err(EscrowError::NotAttester);
        }
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        if booking.status != BookingStatus::Booked {
            return Err(EscrowError::BookingNotBooked {
                booking_id,
                found: booking.status.label(),
            });
        }
        let slot = self
            .slots
            .get(&booking.slot_id)
            .ok_or(EscrowError::SlotNotFound(booking.slot_id))?;

        match outcome {
            Outcome::Completed => {
                let opens_at = slot.start_time.plus_mins(slot.min_overlap_mins);
                let closed_at = slot.session_end().plus_secs(COMPLETED_ATTEST_SLACK_SECS);
                if now < opens_at {
                    return Err(EscrowError::OverlapNotMet { now, opens_at });
                }
                if now > closed_at {
                    return Err(EscrowError::AttestTooLate { now, closed_at });
                }
            }
            Outcome::NoShowHost | Outcome::NoShowGuest => {
                let opens_at = slot.start_time.plus_mins(slot.grace_mins);
                let closed_at = opens_at.plus_mins(slot.duration_mins);
                if now < opens_at {
                    return Err(EscrowError::GraceNotOver { now, opens_at });
                }
                if now > closed_at {
                    return Err(EscrowError::NoShowTooLate { now, closed_at });
                }
            }
        }

        let finalizable_at = now.plus_secs(self.config.challenge_window_secs);
        self.set_booking_status(
            booking_id,
            BookingStatus::Attested {
                outcome,
                evidence,
                finalizable_at,
            },
        );
        tracing::info!(
            "{} attested {}, finalizable at {}",
            booking_id,
            outcome,
            finalizable_at
        );
        Ok(())
    }

    /// Unwind a booking the attester never reported on.
    ///
    /// Available to the guest or the host once the session end plus the
    /// no-attestation buffer has passed with the booking still in the booked
    /// stage. The guest is refunded in full and the slot is cancelled — no
    /// outcome was ever reported, so nothing settled.
    pub fn claim_if_unattested(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        caller: AccountId,
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
        if caller != booking.guest && caller != slot.host {
            return Err(EscrowError::NotBookingParty { booking_id });
        }
        if booking.status != BookingStatus::Booked {
            return Err(EscrowError::BookingNotBooked {
                booking_id,
                found: booking.status.label(),
            });
        }
        let claimable_at = slot
            .session_end()
            .plus_secs(self.config.no_attest_buffer_secs);
        if now < claimable_at {
            return Err(EscrowError::ClaimTooEarly { now, claimable_at });
        }
        let guest = booking.guest;
        let amount = booking.amount;

        let held = self.held.debited(amount)?;
        ledger.payout(guest, amount)?;
        self.held = held;
        self.set_slot_status(slot_id, SlotStatus::Cancelled);
        self.set_booking_finalized(booking_id);

        tracing::info!("{} claimed unattested, {} refunded to {}", booking_id, amount, guest);
        Ok(())
    }

    /// Disburse a finalizable booking according to its effective outcome.
    ///
    /// Callable by anyone once the booking is attested-and-uncontested or
    /// resolved, and its finalizable deadline has passed. `Completed` pays
    /// the host minus the platform fee; `NoShowHost` refunds the guest in
    /// full; `NoShowGuest` pays the host in full.
    pub fn finalize(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        booking_id: BookingId,
    ) -> EscrowResult<()> {
        let booking = self
            .bookings
            .get(&booking_id)
            .ok_or(EscrowError::BookingNotFound(booking_id))?;
        let (outcome, finalizable_at) = match &booking.status {
            BookingStatus::Attested {
                outcome,
                finalizable_at,
                ..
            } => (*outcome, *finalizable_at),
            BookingStatus::Resolved {
                outcome,
                finalizable_at,
            } => (*outcome, *finalizable_at),
            other => {
                return Err(EscrowError::BookingNotFinalizable {
                    booking_id,
                    found: other.label(),
                })
            }
        };
        if now < finalizable_at {
            return Err(EscrowError::ChallengeWindowOpen {
                now,
                finalizable_at,
            });
        }
        let guest = booking.guest;
        let amount = booking.amount;
        let slot_id = booking.slot_id;
        let slot = self
            .slots
            .get(&slot_id)
            .ok_or(EscrowError::SlotNotFound(slot_id))?;
        let host = slot.host;

        let held = self.held.debited(amount)?;
        match outcome {
            Outcome::Completed => {
                let fee = amount.bps_share(self.config.fee_bps);
                let host_net = amount.checked_sub(fee)?;
                if !host_net.is_zero() {
                    ledger.payout(host, host_net)?;
                }
                if !fee.is_zero() {
                    ledger.payout(self.config.treasury, fee)?;
                }
                tracing::info!("{} finalized completed: host {}, fee {}", booking_id, host_net, fee);
            }
            Outcome::NoShowHost => {
                ledger.payout(guest, amount)?;
                tracing::info!("{} finalized no-show-host: {} refunded", booking_id, amount);
            }
            Outcome::NoShowGuest => {
                ledger.payout(host, amount)?;
                tracing::info!("{} finalized no-show-guest: host paid {}", booking_id, amount);
            }
        }
        self.held = held;
        self.set_slot_status(slot_id, SlotStatus::Settled);
        self.set_booking_finalized(booking_id);
        Ok(())
    }
}
