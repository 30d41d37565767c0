//! The escrow engine state
//!
//! A sequential state-transition processor: every operation validates its
//! preconditions (authorization, status, timing, amounts, parameters) against
//! the state immediately before it, then applies one fully-formed transition.
//! The engine never reads a clock and holds no ephemeral state — everything
//! here persists, and a deserialized engine resumes exactly where it left
//! off.

use crate::booking::{Booking, BookingStatus};
use crate::config::EscrowConfig;
use crate::error::{EscrowError, EscrowResult};
use crate::ledger::HeldTotal;
use crate::request::{Request, RequestStatus};
use crate::slot::{Slot, SlotStatus};
use duet_core::{AccountId, Amount, BookingId, RequestId, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The session escrow and dispute engine.
///
/// Owns the persisted tables (slots, bookings, requests, host prices), the
/// held-total accounting, and the id counters. Fund movements go through a
/// [`crate::ledger::LedgerSubmitter`] passed into each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEngine {
    pub(crate) config: EscrowConfig,
    pub(crate) host_prices: BTreeMap<AccountId, Amount>,
    pub(crate) slots: BTreeMap<SlotId, Slot>,
    pub(crate) bookings: BTreeMap<BookingId, Booking>,
    pub(crate) requests: BTreeMap<RequestId, Request>,
    pub(crate) held: HeldTotal,
    pub(crate) next_slot_id: u64,
    pub(crate) next_booking_id: u64,
    pub(crate) next_request_id: u64,
}

impl EscrowEngine {
    /// Create an engine with a validated configuration and empty tables.
    pub fn new(config: EscrowConfig) -> EscrowResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            host_prices: BTreeMap::new(),
            slots: BTreeMap::new(),
            bookings: BTreeMap::new(),
            requests: BTreeMap::new(),
            held: HeldTotal::ZERO,
            next_slot_id: 1,
            next_booking_id: 1,
            next_request_id: 1,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    /// Sum of every balance currently escrowed by the engine.
    pub fn total_held(&self) -> Amount {
        self.held.value()
    }

    /// A host's current base price, if one is set.
    pub fn host_price(&self, host: &AccountId) -> Option<Amount> {
        self.host_prices.get(host).copied()
    }

    /// Look up a slot.
    pub fn slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots.get(&slot_id)
    }

    /// Look up a booking.
    pub fn booking(&self, booking_id: BookingId) -> Option<&Booking> {
        self.bookings.get(&booking_id)
    }

    /// Look up a request.
    pub fn request(&self, request_id: RequestId) -> Option<&Request> {
        self.requests.get(&request_id)
    }

    /// Recompute what the held total must be from first principles.
    ///
    /// The conservation invariant: the held total equals the amount of every
    /// non-finalized booking, plus every open request's escrow, plus one
    /// outstanding bond per disputed booking. The property tests compare
    /// this against [`Self::total_held`] after every operation.
    pub fn expected_held(&self) -> Amount {
        let mut total: u128 = 0;
        for booking in self.bookings.values() {
            if booking.status.is_terminal() {
                continue;
            }
            total += u128::from(booking.amount.value());
            if let BookingStatus::Disputed { bond, .. } = &booking.status {
                total += u128::from(bond.value());
            }
        }
        for request in self.requests.values() {
            if request.status == RequestStatus::Open {
                total += u128::from(request.amount.value());
            }
        }
        // The running total is built from checked credits, so the recomputed
        // sum fits whenever the invariant holds.
        Amount::new(total as u64)
    }

    /// Reject callers that are not the administrator.
    pub(crate) fn require_admin(&self, caller: AccountId) -> EscrowResult<()> {
        if caller != self.config.admin {
            return Err(EscrowError::NotAdmin);
        }
        Ok(())
    }

    /// The id the next slot allocation will take.
    pub(crate) fn peek_slot_id(&self) -> SlotId {
        SlotId::new(self.next_slot_id)
    }

    pub(crate) fn alloc_slot_id(&mut self) -> SlotId {
        let id = SlotId::new(self.next_slot_id);
        self.next_slot_id += 1;
        id
    }

    pub(crate) fn alloc_booking_id(&mut self) -> BookingId {
        let id = BookingId::new(self.next_booking_id);
        self.next_booking_id += 1;
        id
    }

    pub(crate) fn alloc_request_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }

    /// Overwrite a slot's status. Callers have already validated the
    /// transition; a missing slot at this point cannot happen because every
    /// operation resolves the slot before mutating.
    pub(crate) fn set_slot_status(&mut self, slot_id: SlotId, status: SlotStatus) {
        if let Some(slot) = self.slots.get_mut(&slot_id) {
            slot.status = status;
        }
    }

    pub(crate) fn set_booking_status(&mut self, booking_id: BookingId, status: BookingStatus) {
        if let Some(booking) = self.bookings.get_mut(&booking_id) {
            booking.status = status;
        }
    }

    pub(crate) fn set_booking_finalized(&mut self, booking_id: BookingId) {
        self.set_booking_status(booking_id, BookingStatus::Finalized);
    }
}
