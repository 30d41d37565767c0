//! Conservation assertions
//!
//! The engine's core invariant, checkable after any operation: the held total
//! matches the sum recomputed from the tables, and the ledger pot covers it.

use crate::ledger::MemoryLedger;
use duet_escrow::{EscrowEngine, LedgerSubmitter};

/// Assert the conservation invariant holds for an engine/ledger pair.
///
/// Panics with a description of the drift if `total_held` disagrees with the
/// recomputed sum, or if the escrow pot no longer covers the held total.
pub fn assert_conserved(engine: &EscrowEngine, ledger: &MemoryLedger) {
    let held = engine.total_held();
    let expected = engine.expected_held();
    assert_eq!(
        held, expected,
        "held total {held} diverged from recomputed {expected}"
    );

    let balance = ledger.escrow_balance();
    assert!(
        balance >= held,
        "escrow pot {balance} no longer covers held total {held}"
    );
}
