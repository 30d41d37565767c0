//! End-to-end protocol scenarios
//!
//! Each test walks one full lifecycle through the engine against the
//! in-memory ledger and checks the resulting payouts, statuses, and the
//! conservation invariant.

use assert_matches::assert_matches;
use duet_testkit::*;

const DAY_SECS: u64 = 86_400;

/// Booking requires the exact snapshot price and escrows it.
#[test]
fn booking_escrows_exact_price() {
    let mut fx = EngineFixture::new();
    let slot_id = fx.open_slot();

    // Half the price is an amount mismatch, not a partial escrow.
    let half = Amount::new(PRICE.value() / 2);
    let err = fx
        .engine
        .book(&mut fx.ledger, fx.guest, slot_id, half)
        .unwrap_err();
    assert_matches!(err, EscrowError::PaymentMismatch { .. });
    assert_eq!(fx.engine.total_held(), Amount::ZERO);

    let booking_id = fx.book(slot_id);
    let booking = fx.engine.booking(booking_id).unwrap();
    assert_eq!(booking.status, BookingStatus::Booked);
    assert_eq!(booking.amount, PRICE);
    assert_eq!(fx.engine.total_held(), PRICE);
    assert_eq!(fx.engine.slot(slot_id).unwrap().status, SlotStatus::Booked);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Early guest cancellation refunds in full and reopens the slot for a new
/// guest.
#[test]
fn early_guest_cancel_reopens_slot() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();
    let guest_before = fx.ledger.balance_of(&fx.guest);

    // Well before the cutoff (cutoff is two hours before start).
    let now = START.minus_mins(CANCEL_CUTOFF_MINS + 60);
    fx.engine
        .cancel_booking_as_guest(&mut fx.ledger, now, fx.guest, booking_id)
        .unwrap();

    assert_eq!(
        fx.ledger.balance_of(&fx.guest),
        guest_before.checked_add(PRICE).unwrap()
    );
    assert_eq!(fx.engine.slot(slot_id).unwrap().status, SlotStatus::Open);
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);

    // The reopened slot is bookable by a second guest.
    let rebooked = fx
        .engine
        .book(&mut fx.ledger, fx.guest2, slot_id, PRICE)
        .unwrap();
    assert_eq!(fx.engine.booking(rebooked).unwrap().guest, fx.guest2);
    assert_eq!(fx.engine.total_held(), PRICE);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Late guest cancellation carves out the penalty and fee.
#[test]
fn late_guest_cancel_pays_host_and_treasury() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();

    // Past the cutoff: 25% penalty, then 3% fee on the host's gross.
    let now = START.minus_mins(CANCEL_CUTOFF_MINS - 30);
    fx.engine
        .cancel_booking_as_guest(&mut fx.ledger, now, fx.guest, booking_id)
        .unwrap();

    let penalty = Amount::new(250_000);
    let host_gross = Amount::new(750_000);
    let fee = Amount::new(22_500);
    assert_eq!(
        fx.ledger.balance_of(&fx.host),
        host_gross.checked_sub(fee).unwrap()
    );
    assert_eq!(
        fx.ledger.balance_of(&fx.treasury),
        penalty.checked_add(fee).unwrap()
    );
    assert_eq!(fx.engine.slot(slot_id).unwrap().status, SlotStatus::Settled);
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Host cancellation always refunds the guest in full.
#[test]
fn host_cancel_refunds_guest() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();
    let guest_before = fx.ledger.balance_of(&fx.guest);

    fx.engine
        .cancel_booking_as_host(&mut fx.ledger, fx.host, booking_id)
        .unwrap();

    assert_eq!(
        fx.ledger.balance_of(&fx.guest),
        guest_before.checked_add(PRICE).unwrap()
    );
    assert_eq!(
        fx.engine.slot(slot_id).unwrap().status,
        SlotStatus::Cancelled
    );
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Attested-completed booking finalizes into host payout minus fee.
#[test]
fn completed_session_pays_host_minus_fee() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();

    let attest_at = START.plus_mins(MIN_OVERLAP_MINS);
    fx.engine
        .attest(
            attest_at,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("ipfs://evidence"),
        )
        .unwrap();

    // Still inside the challenge window: finalize is premature.
    let err = fx
        .engine
        .finalize(&mut fx.ledger, attest_at.plus_secs(10), booking_id)
        .unwrap_err();
    assert_matches!(err, EscrowError::ChallengeWindowOpen { .. });

    let after_window = attest_at.plus_secs(DAY_SECS);
    fx.engine
        .finalize(&mut fx.ledger, after_window, booking_id)
        .unwrap();

    assert_eq!(fx.ledger.balance_of(&fx.host), Amount::new(970_000));
    assert_eq!(fx.ledger.balance_of(&fx.treasury), Amount::new(30_000));
    assert_eq!(fx.engine.slot(slot_id).unwrap().status, SlotStatus::Settled);
    assert_eq!(
        fx.engine.booking(booking_id).unwrap().status,
        BookingStatus::Finalized
    );
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// A winning challenge flips the outcome and returns the bond.
#[test]
fn overriding_resolution_refunds_challenger_and_guest() {
    let mut fx = EngineFixture::new();
    let (_slot_id, booking_id) = fx.booked_slot();
    let guest_before = fx.ledger.balance_of(&fx.guest);

    let attest_at = START.plus_mins(MIN_OVERLAP_MINS);
    fx.engine
        .attest(
            attest_at,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("ipfs://evidence"),
        )
        .unwrap();

    let challenge_at = attest_at.plus_secs(600);
    fx.engine
        .challenge(&mut fx.ledger, challenge_at, fx.guest, booking_id, BOND)
        .unwrap();
    assert_eq!(
        fx.engine.total_held(),
        PRICE.checked_add(BOND).unwrap()
    );
    assert_conserved(&fx.engine, &fx.ledger);

    let resolve_at = challenge_at.plus_secs(3_600);
    fx.engine
        .resolve_dispute(
            &mut fx.ledger,
            resolve_at,
            fx.admin,
            booking_id,
            Outcome::NoShowHost,
        )
        .unwrap();
    assert_conserved(&fx.engine, &fx.ledger);

    // Resolution makes the booking immediately finalizable.
    fx.engine
        .finalize(&mut fx.ledger, resolve_at, booking_id)
        .unwrap();

    // Bond returned and the full amount refunded: the guest is made whole.
    assert_eq!(
        fx.ledger.balance_of(&fx.guest),
        guest_before.checked_add(PRICE).unwrap()
    );
    assert_eq!(fx.ledger.balance_of(&fx.host), Amount::ZERO);
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Administrator inaction: timeout keeps the outcome and costs the
/// challenger nothing.
#[test]
fn dispute_timeout_defaults_to_original_outcome() {
    let mut fx = EngineFixture::new();
    let (_slot_id, booking_id) = fx.booked_slot();

    let attest_at = START.plus_mins(MIN_OVERLAP_MINS);
    fx.engine
        .attest(
            attest_at,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("ipfs://evidence"),
        )
        .unwrap();

    let challenge_at = attest_at.plus_secs(600);
    fx.engine
        .challenge(&mut fx.ledger, challenge_at, fx.guest, booking_id, BOND)
        .unwrap();
    let guest_after_bond = fx.ledger.balance_of(&fx.guest);

    // Too early for the timeout path.
    let err = fx
        .engine
        .finalize_dispute_by_timeout(&mut fx.ledger, challenge_at.plus_secs(10), booking_id)
        .unwrap_err();
    assert_matches!(err, EscrowError::DisputeTimeoutPending { .. });

    let timeout_at = challenge_at.plus_secs(2 * DAY_SECS);
    fx.engine
        .finalize_dispute_by_timeout(&mut fx.ledger, timeout_at, booking_id)
        .unwrap();

    // Bond back, no penalty.
    assert_eq!(
        fx.ledger.balance_of(&fx.guest),
        guest_after_bond.checked_add(BOND).unwrap()
    );
    assert_conserved(&fx.engine, &fx.ledger);

    // The original outcome stands: host is paid minus fee.
    fx.engine
        .finalize(&mut fx.ledger, timeout_at, booking_id)
        .unwrap();
    assert_eq!(fx.ledger.balance_of(&fx.host), Amount::new(970_000));
    assert_eq!(fx.ledger.balance_of(&fx.treasury), Amount::new(30_000));
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// A targeted request above the base price books at the full offer while the
/// slot snapshots the lower price.
#[test]
fn accepted_request_keeps_guest_offer() {
    let mut fx = EngineFixture::new();
    fx.engine.set_base_price(fx.host, PRICE).unwrap();

    let offer = Amount::new(2_000_000);
    let now = START.minus_mins(24 * 60);
    let window_end = START.plus_secs(DAY_SECS);
    let request_id = fx
        .engine
        .create_request(
            &mut fx.ledger,
            now,
            fx.guest,
            Some(fx.host),
            START,
            window_end,
            DURATION_MINS,
            START,
            offer,
        )
        .unwrap();
    assert_eq!(fx.engine.total_held(), offer);
    assert_conserved(&fx.engine, &fx.ledger);

    let accept_at = now.plus_secs(600);
    let (slot_id, booking_id) = fx
        .engine
        .accept_request(
            accept_at,
            fx.host,
            request_id,
            START,
            GRACE_MINS,
            MIN_OVERLAP_MINS,
            CANCEL_CUTOFF_MINS,
        )
        .unwrap();

    // Slot snapshots the host's base price; booking keeps the offer.
    assert_eq!(fx.engine.slot(slot_id).unwrap().price, PRICE);
    assert_eq!(fx.engine.booking(booking_id).unwrap().amount, offer);
    // Conversion moves no funds.
    assert_eq!(fx.engine.total_held(), offer);
    assert_matches!(
        fx.engine.request(request_id).unwrap().status,
        RequestStatus::Accepted { .. }
    );
    assert_conserved(&fx.engine, &fx.ledger);

    // Settlement pays the host on the full offer, not the snapshot.
    let attest_at = START.plus_mins(MIN_OVERLAP_MINS);
    fx.engine
        .attest(
            attest_at,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("sig:host+guest"),
        )
        .unwrap();
    fx.engine
        .finalize(&mut fx.ledger, attest_at.plus_secs(DAY_SECS), booking_id)
        .unwrap();

    let fee = Amount::new(60_000);
    assert_eq!(
        fx.ledger.balance_of(&fx.host),
        offer.checked_sub(fee).unwrap()
    );
    assert_eq!(fx.ledger.balance_of(&fx.treasury), fee);
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Terminal records refuse every further transition.
#[test]
fn finalized_booking_and_settled_slot_are_terminal() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();

    let attest_at = START.plus_mins(MIN_OVERLAP_MINS);
    fx.engine
        .attest(
            attest_at,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("ref"),
        )
        .unwrap();
    let after = attest_at.plus_secs(DAY_SECS);
    fx.engine.finalize(&mut fx.ledger, after, booking_id).unwrap();

    assert_matches!(
        fx.engine.finalize(&mut fx.ledger, after, booking_id),
        Err(EscrowError::BookingNotFinalizable { .. })
    );
    assert_matches!(
        fx.engine
            .cancel_booking_as_guest(&mut fx.ledger, after, fx.guest, booking_id),
        Err(EscrowError::BookingNotBooked { .. })
    );
    assert_matches!(
        fx.engine
            .cancel_booking_as_host(&mut fx.ledger, fx.host, booking_id),
        Err(EscrowError::BookingNotBooked { .. })
    );
    assert_matches!(
        fx.engine.attest(
            after,
            fx.attester,
            booking_id,
            Outcome::Completed,
            EvidenceRef::new("again"),
        ),
        Err(EscrowError::BookingNotBooked { .. })
    );
    assert_matches!(
        fx.engine
            .challenge(&mut fx.ledger, after, fx.guest, booking_id, BOND),
        Err(EscrowError::BookingNotAttested { .. })
    );
    assert_matches!(
        fx.engine.book(&mut fx.ledger, fx.guest2, slot_id, PRICE),
        Err(EscrowError::SlotNotOpen { .. })
    );
    assert_matches!(
        fx.engine.cancel_slot(fx.host, slot_id),
        Err(EscrowError::SlotNotOpen { .. })
    );
    assert_conserved(&fx.engine, &fx.ledger);
}

/// A booking the attester never touched unwinds after the buffer.
#[test]
fn unattested_booking_claims_refund() {
    let mut fx = EngineFixture::new();
    let (slot_id, booking_id) = fx.booked_slot();
    let guest_before = fx.ledger.balance_of(&fx.guest);

    let session_end = START.plus_mins(DURATION_MINS);
    let err = fx
        .engine
        .claim_if_unattested(&mut fx.ledger, session_end, fx.guest, booking_id)
        .unwrap_err();
    assert_matches!(err, EscrowError::ClaimTooEarly { .. });

    let claimable = session_end.plus_secs(3_600);
    fx.engine
        .claim_if_unattested(&mut fx.ledger, claimable, fx.guest, booking_id)
        .unwrap();

    assert_eq!(
        fx.ledger.balance_of(&fx.guest),
        guest_before.checked_add(PRICE).unwrap()
    );
    // No outcome was ever reported, so the slot cancels rather than settles.
    assert_eq!(
        fx.engine.slot(slot_id).unwrap().status,
        SlotStatus::Cancelled
    );
    assert_eq!(
        fx.engine.booking(booking_id).unwrap().status,
        BookingStatus::Finalized
    );
    assert_eq!(fx.engine.total_held(), Amount::ZERO);
    assert_conserved(&fx.engine, &fx.ledger);
}

/// Surplus on the escrow account is sweepable without touching escrowed
/// funds.
#[test]
fn sweep_recovers_only_surplus() {
    let mut fx = EngineFixture::new();
    let (_slot_id, _booking_id) = fx.booked_slot();

    fx.ledger.donate_to_pot(Amount::new(42_000));

    let err = fx.engine.sweep(&mut fx.ledger, fx.guest).unwrap_err();
    assert_matches!(err, EscrowError::NotAdmin);

    let swept = fx.engine.sweep(&mut fx.ledger, fx.admin).unwrap();
    assert_eq!(swept, Amount::new(42_000));
    assert_eq!(fx.ledger.balance_of(&fx.treasury), Amount::new(42_000));
    // The escrowed booking amount stays put.
    assert_eq!(fx.ledger.escrow_balance(), PRICE);
    assert_eq!(fx.engine.total_held(), PRICE);
    assert_conserved(&fx.engine, &fx.ledger);

    // Nothing left to sweep.
    let swept = fx.engine.sweep(&mut fx.ledger, fx.admin).unwrap();
    assert_eq!(swept, Amount::ZERO);
}
