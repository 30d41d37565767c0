//! Slot manager
//!
//! Host-side inventory: base prices, slot creation, and open-slot
//! cancellation. Slots snapshot the host's base price at creation, so later
//! price changes never retroactively affect outstanding slots.

use crate::engine::EscrowEngine;
use crate::error::{EscrowError, EscrowResult};
use duet_core::{AccountId, Amount, SlotId, Timestamp};
use serde::{Deserialize, Serialize};

/// Longest permitted cancellation cutoff: seven days in minutes.
pub const MAX_CANCEL_CUTOFF_MINS: u32 = 10_080;

/// Lifecycle status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    /// Published and bookable.
    Open,
    /// Reserved by a booking.
    Booked,
    /// Unwound with no reported outcome. Terminal.
    Cancelled,
    /// A financial outcome tied to the session occurred, even if it was a
    /// full refund. Terminal.
    Settled,
}

impl SlotStatus {
    /// Short status label for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            SlotStatus::Open => "open",
            SlotStatus::Booked => "booked",
            SlotStatus::Cancelled => "cancelled",
            SlotStatus::Settled => "settled",
        }
    }
}

/// A host-published, priced, bookable time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot identifier.
    pub id: SlotId,
    /// Publishing host.
    pub host: AccountId,
    /// Scheduled session start.
    pub start_time: Timestamp,
    /// Session length in minutes.
    pub duration_mins: u32,
    /// Minutes after start before a no-show can be reported.
    pub grace_mins: u32,
    /// Minutes of overlap required before a completed session can be
    /// attested.
    pub min_overlap_mins: u32,
    /// Minutes before start after which guest cancellation turns late.
    pub cancel_cutoff_mins: u32,
    /// Price snapshot taken from the host's base price at creation.
    pub price: Amount,
    /// Current lifecycle status.
    pub status: SlotStatus,
}

impl Slot {
    /// Scheduled end of the session.
    pub fn session_end(&self) -> Timestamp {
        self.start_time.plus_mins(self.duration_mins)
    }

    /// Moment the guest cancellation economics flip from early to late.
    pub fn cancel_cutoff(&self) -> Timestamp {
        self.start_time.minus_mins(self.cancel_cutoff_mins)
    }
}

impl EscrowEngine {
    /// Set or overwrite the host's base price.
    ///
    /// No effect on existing slots: each slot keeps the snapshot it was
    /// created with.
    pub fn set_base_price(&mut self, host: AccountId, price: Amount) -> EscrowResult<()> {
        if price.is_zero() {
            return Err(EscrowError::ZeroPrice);
        }
        self.host_prices.insert(host, price);
        tracing::debug!("base price for {} set to {}", host, price);
        Ok(())
    }

    /// Publish a single open slot, snapshotting the host's base price.
    pub fn create_slot(
        &mut self,
        host: AccountId,
        start_time: Timestamp,
        duration_mins: u32,
        grace_mins: u32,
        min_overlap_mins: u32,
        cancel_cutoff_mins: u32,
    ) -> EscrowResult<SlotId> {
        self.create_slots(
            host,
            start_time,
            duration_mins,
            grace_mins,
            min_overlap_mins,
            cancel_cutoff_mins,
            1,
        )
    }

    /// Publish a batch of identical open slots sharing one price snapshot.
    ///
    /// Ids are assigned contiguously; the first id of the run is returned.
    pub fn create_slots(
        &mut self,
        host: AccountId,
        start_time: Timestamp,
        duration_mins: u32,
        grace_mins: u32,
        min_overlap_mins: u32,
        cancel_cutoff_mins: u32,
        count: u32,
    ) -> EscrowResult<SlotId> {
        if count == 0 {
            return Err(EscrowError::EmptyBatch);
        }
        if duration_mins == 0 {
            return Err(EscrowError::ZeroDuration);
        }
        if cancel_cutoff_mins > MAX_CANCEL_CUTOFF_MINS {
            return Err(EscrowError::CutoffTooLong { cancel_cutoff_mins });
        }
        let price = *self
            .host_prices
            .get(&host)
            .ok_or(EscrowError::NoBasePrice { host })?;

        let first = self.peek_slot_id();
        for _ in 0..count {
            let id = self.alloc_slot_id();
            self.slots.insert(
                id,
                Slot {
                    id,
                    host,
                    start_time,
                    duration_mins,
                    grace_mins,
                    min_overlap_mins,
                    cancel_cutoff_mins,
                    price,
                    status: SlotStatus::Open,
                },
            );
        }
        tracing::debug!("{} created {} slot(s) from {} at price {}", host, count, first, price);
        Ok(first)
    }

    /// Cancel an open slot. Host-only; booked or terminal slots are refused.
    pub fn cancel_slot(&mut self, host: AccountId, slot_id: SlotId) -> EscrowResult<()> {
        let slot = self
            .slots
            .get_mut(&slot_id)
            .ok_or(EscrowError::SlotNotFound(slot_id))?;
        if slot.host != host {
            return Err(EscrowError::NotSlotHost { slot_id });
        }
        if slot.status != SlotStatus::Open {
            return Err(EscrowError::SlotNotOpen {
                slot_id,
                found: slot.status.label(),
            });
        }
        slot.status = SlotStatus::Cancelled;
        tracing::debug!("{} cancelled by host", slot_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EscrowConfig;
    use assert_matches::assert_matches;
    use duet_core::BasisPoints;

    fn engine() -> EscrowEngine {
        EscrowEngine::new(EscrowConfig {
            admin: AccountId::from_bytes([1u8; 16]),
            attester: AccountId::from_bytes([2u8; 16]),
            treasury: AccountId::from_bytes([3u8; 16]),
            fee_bps: BasisPoints::new(300),
            late_cancel_penalty_bps: BasisPoints::new(2_500),
            challenge_bond: Amount::new(100_000),
            challenge_window_secs: 86_400,
            no_attest_buffer_secs: 3_600,
            dispute_timeout_secs: 172_800,
        })
        .unwrap()
    }

    fn host() -> AccountId {
        AccountId::from_bytes([10u8; 16])
    }

    #[test]
    fn test_create_slot_requires_base_price() {
        let mut engine = engine();
        let start = Timestamp::from_unix(1_700_000_000);

        let err = engine.create_slot(host(), start, 60, 10, 15, 120);
        assert_matches!(err, Err(EscrowError::NoBasePrice { .. }));

        engine.set_base_price(host(), Amount::new(1_000_000)).unwrap();
        let slot_id = engine.create_slot(host(), start, 60, 10, 15, 120).unwrap();
        let slot = engine.slot(slot_id).unwrap();
        assert_eq!(slot.price, Amount::new(1_000_000));
        assert_eq!(slot.status, SlotStatus::Open);
    }

    #[test]
    fn test_price_snapshot_isolation() {
        let mut engine = engine();
        let start = Timestamp::from_unix(1_700_000_000);

        engine.set_base_price(host(), Amount::new(1_000_000)).unwrap();
        let slot_id = engine.create_slot(host(), start, 60, 10, 15, 120).unwrap();

        engine.set_base_price(host(), Amount::new(5_000_000)).unwrap();
        assert_eq!(engine.slot(slot_id).unwrap().price, Amount::new(1_000_000));

        let second = engine.create_slot(host(), start, 60, 10, 15, 120).unwrap();
        assert_eq!(engine.slot(second).unwrap().price, Amount::new(5_000_000));
    }

    #[test]
    fn test_batch_ids_are_contiguous() {
        let mut engine = engine();
        engine.set_base_price(host(), Amount::new(500)).unwrap();
        let start = Timestamp::from_unix(1_700_000_000);

        let first = engine
            .create_slots(host(), start, 30, 5, 10, 60, 4)
            .unwrap();
        for offset in 0..4 {
            let id = SlotId::new(first.value() + offset);
            assert_eq!(engine.slot(id).unwrap().price, Amount::new(500));
        }
        // The run is dense: the next allocation continues after it.
        let next = engine.create_slot(host(), start, 30, 5, 10, 60).unwrap();
        assert_eq!(next.value(), first.value() + 4);
    }

    #[test]
    fn test_cutoff_over_seven_days_rejected() {
        let mut engine = engine();
        engine.set_base_price(host(), Amount::new(500)).unwrap();
        let start = Timestamp::from_unix(1_700_000_000);

        assert_matches!(
            engine.create_slot(host(), start, 30, 5, 10, 10_081),
            Err(EscrowError::CutoffTooLong { cancel_cutoff_mins: 10_081 })
        );
        assert!(engine.create_slot(host(), start, 30, 5, 10, 10_080).is_ok());
    }

    #[test]
    fn test_cancel_slot_host_only_open_only() {
        let mut engine = engine();
        engine.set_base_price(host(), Amount::new(500)).unwrap();
        let start = Timestamp::from_unix(1_700_000_000);
        let slot_id = engine.create_slot(host(), start, 30, 5, 10, 60).unwrap();

        let stranger = AccountId::from_bytes([99u8; 16]);
        assert_matches!(
            engine.cancel_slot(stranger, slot_id),
            Err(EscrowError::NotSlotHost { .. })
        );

        engine.cancel_slot(host(), slot_id).unwrap();
        assert_eq!(engine.slot(slot_id).unwrap().status, SlotStatus::Cancelled);

        // Terminal: cancelling again is a state mismatch.
        assert_matches!(
            engine.cancel_slot(host(), slot_id),
            Err(EscrowError::SlotNotOpen { .. })
        );
    }

    #[test]
    fn test_zero_price_rejected() {
        let mut engine = engine();
        assert_matches!(
            engine.set_base_price(host(), Amount::ZERO),
            Err(EscrowError::ZeroPrice)
        );
    }
}
