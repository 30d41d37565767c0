//! Engine fixtures
//!
//! A ready-made engine with funded parties and sensible defaults, so scenario
//! tests read as protocol narratives instead of setup boilerplate.

use crate::ledger::MemoryLedger;
use crate::test_account;
use duet_core::{AccountId, Amount, BasisPoints, BookingId, SlotId, Timestamp};
use duet_escrow::{EscrowConfig, EscrowEngine};

/// Default slot price: one unit at micro-unit scale.
pub const PRICE: Amount = Amount::new(1_000_000);

/// Default challenge bond.
pub const BOND: Amount = Amount::new(100_000);

/// Default scheduled session start.
pub const START: Timestamp = Timestamp::from_unix(1_700_100_000);

/// Default session length in minutes.
pub const DURATION_MINS: u32 = 60;

/// Default no-show grace in minutes.
pub const GRACE_MINS: u32 = 10;

/// Default minimum overlap in minutes.
pub const MIN_OVERLAP_MINS: u32 = 15;

/// Default cancellation cutoff in minutes.
pub const CANCEL_CUTOFF_MINS: u32 = 120;

/// A deterministic engine configuration for tests.
///
/// 3% platform fee, 25% late-cancellation penalty, one-day challenge window,
/// one-hour no-attestation buffer, two-day dispute timeout.
pub fn test_config() -> EscrowConfig {
    EscrowConfig {
        admin: test_account(1),
        attester: test_account(2),
        treasury: test_account(3),
        fee_bps: BasisPoints::new(300),
        late_cancel_penalty_bps: BasisPoints::new(2_500),
        challenge_bond: BOND,
        challenge_window_secs: 86_400,
        no_attest_buffer_secs: 3_600,
        dispute_timeout_secs: 172_800,
    }
}

/// An engine plus an in-memory ledger with funded parties.
#[derive(Debug)]
pub struct EngineFixture {
    /// The engine under test.
    pub engine: EscrowEngine,
    /// The ledger the engine instructs.
    pub ledger: MemoryLedger,
    /// Administrator account (seed 1).
    pub admin: AccountId,
    /// Attester account (seed 2).
    pub attester: AccountId,
    /// Treasury account (seed 3).
    pub treasury: AccountId,
    /// A host with no base price yet (seed 10).
    pub host: AccountId,
    /// A funded guest (seed 20).
    pub guest: AccountId,
    /// A second funded guest (seed 21).
    pub guest2: AccountId,
}

impl EngineFixture {
    /// Build a fixture with the default config and ten units per guest.
    pub fn new() -> Self {
        let engine = EscrowEngine::new(test_config()).expect("test config is valid");
        let mut ledger = MemoryLedger::new();
        let guest = test_account(20);
        let guest2 = test_account(21);
        let host = test_account(10);
        ledger.fund(guest, Amount::new(10_000_000));
        ledger.fund(guest2, Amount::new(10_000_000));
        Self {
            engine,
            ledger,
            admin: test_account(1),
            attester: test_account(2),
            treasury: test_account(3),
            host,
            guest,
            guest2,
        }
    }

    /// Publish an open slot at [`PRICE`] with the default shape, setting the
    /// host's base price on first use.
    pub fn open_slot(&mut self) -> SlotId {
        if self.engine.host_price(&self.host).is_none() {
            self.engine
                .set_base_price(self.host, PRICE)
                .expect("price is valid");
        }
        self.engine
            .create_slot(
                self.host,
                START,
                DURATION_MINS,
                GRACE_MINS,
                MIN_OVERLAP_MINS,
                CANCEL_CUTOFF_MINS,
            )
            .expect("slot creation succeeds")
    }

    /// Book a slot as the default guest at its price.
    pub fn book(&mut self, slot_id: SlotId) -> BookingId {
        let price = self
            .engine
            .slot(slot_id)
            .expect("slot exists")
            .price;
        self.engine
            .book(&mut self.ledger, self.guest, slot_id, price)
            .expect("booking succeeds")
    }

    /// Publish-and-book in one step.
    pub fn booked_slot(&mut self) -> (SlotId, BookingId) {
        let slot_id = self.open_slot();
        let booking_id = self.book(slot_id);
        (slot_id, booking_id)
    }
}

impl Default for EngineFixture {
    fn default() -> Self {
        Self::new()
    }
}
