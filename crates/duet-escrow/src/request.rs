//! Request matching
//!
//! Guest-initiated, pre-escrowed offers for a session — open to any host or
//! targeted at one. Acceptance converts a request into a slot-and-booking
//! pair without moving any funds: the escrow was counted at request creation,
//! and the booking carries the guest's original offer even when it exceeds
//! the accepting host's snapshot price.

use crate::booking::{Booking, BookingStatus};
use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use crate::ledger::LedgerSubmitter;
use crate::slot::{Slot, SlotStatus, MAX_CANCEL_CUTOFF_MINS};
use duet_core::{AccountId, Amount, BookingId, RequestId, SlotId, Timestamp};
use serde::{Deserialize, Serialize};

/// Minimum lead time between "now" and a session start: sixty seconds.
pub const MIN_LEAD_SECS: u64 = 60;

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Posted and escrowed; awaiting a host.
    Open,
    /// Converted into a slot and booking. Terminal.
    Accepted {
        /// The host that accepted.
        host: AccountId,
        /// The slot created at acceptance.
        slot_id: SlotId,
        /// The booking created at acceptance.
        booking_id: BookingId,
    },
    /// Withdrawn by the guest and refunded. Terminal.
    Cancelled,
}

impl RequestStatus {
    /// Short status label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Accepted { .. } => "accepted",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

/// A guest-initiated, pre-escrowed offer for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier.
    pub id: RequestId,
    /// The offering guest.
    pub guest: AccountId,
    /// Target host; `None` leaves the request open to any host.
    pub host_target: Option<AccountId>,
    /// Earliest acceptable session start.
    pub window_start: Timestamp,
    /// Latest acceptable session start.
    pub window_end: Timestamp,
    /// Requested session length in minutes.
    pub duration_mins: u32,
    /// When the offer stops being acceptable. Expiry never auto-cancels:
    /// an expired request stays refundable by the guest.
    pub expiry: Timestamp,
    /// Escrowed offer; immutable once escrowed.
    pub amount: Amount,
    /// Current lifecycle status.
    pub status: RequestStatus,
}

impl EscrowEngine {
    /// Post a session request, escrowing the offer up front.
    pub fn create_request(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        now: Timestamp,
        guest: AccountId,
        host_target: Option<AccountId>,
        window_start: Timestamp,
        window_end: Timestamp,
        duration_mins: u32,
        expiry: Timestamp,
        payment: Amount,
    ) -> EscrowResult<RequestId> {
        if payment.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }
        if duration_mins == 0 {
            return Err(EscrowError::ZeroDuration);
        }
        if window_start > window_end {
            return Err(EscrowError::WindowInverted {
                window_start,
                window_end,
            });
        }
        if expiry > window_end {
            return Err(EscrowError::ExpiryPastWindow { expiry, window_end });
        }
        let earliest = now.plus_secs(MIN_LEAD_SECS);
        if window_start < earliest {
            return Err(EscrowError::StartTooSoon {
                start_time: window_start,
                earliest,
            });
        }
        if let Some(target) = host_target {
            let base_price = *self
                .host_prices
                .get(&target)
                .ok_or(EscrowError::NoBasePrice { host: target })?;
            if payment < base_price {
                return Err(EscrowError::LowOffer {
                    offer: payment,
                    base_price,
                });
            }
        }

        let held = self.held.credited(payment)?;
        ledger.deposit(guest, payment)?;
        self.held = held;

        let request_id = self.alloc_request_id();
        self.requests.insert(
            request_id,
            Request {
                id: request_id,
                guest,
                host_target,
                window_start,
                window_end,
                duration_mins,
                expiry,
                amount: payment,
                status: RequestStatus::Open,
            },
        );

        tracing::info!("{} posted by {} offering {}", request_id, guest, payment);
        Ok(request_id)
    }

    /// Withdraw an open request for a full refund. Guest-only.
    ///
    /// Works on expired requests too — expiry only stops acceptance.
    pub fn cancel_request(
        &mut self,
        ledger: &mut dyn LedgerSubmitter,
        guest: AccountId,
        request_id: RequestId,
    ) -> EscrowResult<()> {
        let request = self
            .requests
            .get(&request_id)
            .ok_or(EscrowError::RequestNotFound(request_id))?;
        if request.guest != guest {
            return Err(EscrowError::NotRequestGuest { request_id });
        }
        if request.status != RequestStatus::Open {
            return Err(EscrowError::RequestNotOpen {
                request_id,
                found: request.status.label(),
            });
        }
        let amount = request.amount;

        let held = self.held.debited(amount)?;
        ledger.payout(guest, amount)?;
        self.held = held;
        if let Some(request) = self.requests.get_mut(&request_id) {
            request.status = RequestStatus::Cancelled;
        }

        tracing::info!("{} cancelled, {} refunded to {}", request_id, amount, guest);
        Ok(())
    }

    /// Accept an open request, converting it into a booked slot.
    ///
    /// The caller must be the targeted host (or any host with a base price
    /// for untargeted requests). The new slot snapshots the accepting host's
    /// current base price, while the booking keeps the guest's original
    /// offer — the host is paid on the full offer at settlement. No funds
    /// move: the escrow was counted when the request was created.
    pub fn accept_request(
        &mut self,
        now: Timestamp,
        host: AccountId,
        request_id: RequestId,
        start_time: Timestamp,
        grace_mins: u32,
        min_overlap_mins: u32,
        cancel_cutoff_mins: u32,
    ) -> EscrowResult<(SlotId, BookingId)> {
        let request = self
            .requests
            .get(&request_id)
            .ok_or(EscrowError::RequestNotFound(request_id))?;
        if let Some(target) = request.host_target {
            if target != host {
                return Err(EscrowError::NotRequestTarget { request_id });
            }
        }
        if request.status != RequestStatus::Open {
            return Err(EscrowError::RequestNotOpen {
                request_id,
                found: request.status.label(),
            });
        }
        if now >= request.expiry {
            return Err(EscrowError::RequestExpired {
                request_id,
                expiry: request.expiry,
                now,
            });
        }
        if start_time < request.window_start || start_time > request.window_end {
            return Err(EscrowError::StartOutsideWindow {
                start_time,
                window_start: request.window_start,
                window_end: request.window_end,
            });
        }
        let earliest = now.plus_secs(MIN_LEAD_SECS);
        if start_time < earliest {
            return Err(EscrowError::StartTooSoon {
                start_time,
                earliest,
            });
        }
        if cancel_cutoff_mins > MAX_CANCEL_CUTOFF_MINS {
            return Err(EscrowError::CutoffTooLong { cancel_cutoff_mins });
        }
        let price = *self
            .host_prices
            .get(&host)
            .ok_or(EscrowError::NoBasePrice { host })?;
        let guest = request.guest;
        let amount = request.amount;
        let duration_mins = request.duration_mins;

        let slot_id = self.alloc_slot_id();
        let booking_id = self.alloc_booking_id();
        self.slots.insert(
            slot_id,
            Slot {
                id: slot_id,
                host,
                start_time,
                duration_mins,
                grace_mins,
                min_overlap_mins,
                cancel_cutoff_mins,
                price,
                status: SlotStatus::Booked,
            },
        );
        self.bookings.insert(
            booking_id,
            Booking {
                id: booking_id,
                slot_id,
                guest,
                amount,
                status: BookingStatus::Booked,
            },
        );
        if let Some(request) = self.requests.get_mut(&request_id) {
            request.status = RequestStatus::Accepted {
                host,
                slot_id,
                booking_id,
            };
        }

        tracing::info!(
            "{} accepted by {}: {} and {} created",
            request_id,
            host,
            slot_id,
            booking_id
        );
        Ok((slot_id, booking_id))
    }
}
