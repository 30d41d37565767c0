//! Duet Testing Infrastructure
//!
//! Common test setup for the escrow engine crates: a deterministic in-memory
//! ledger submitter, an engine fixture with funded parties, and conservation
//! assertions.
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! duet-testkit = { path = "../duet-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use duet_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     let mut fx = EngineFixture::new();
//!     let slot_id = fx.open_slot();
//!     let booking_id = fx.book(slot_id);
//!     assert_conserved(&fx.engine, &fx.ledger);
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod assertions;
pub mod fixtures;
pub mod ledger;

pub use assertions::*;
pub use fixtures::*;
pub use ledger::*;

// Re-export commonly used external types for convenience
pub use duet_core::{
    AccountId, Amount, BasisPoints, BookingId, EvidenceRef, RequestId, SlotId, Timestamp,
};
pub use duet_escrow::{
    BookingStatus, EscrowConfig, EscrowEngine, EscrowError, LedgerSubmitter, Outcome,
    RequestStatus, SlotStatus,
};

/// Deterministic test account derived from a seed byte.
pub fn test_account(seed: u8) -> AccountId {
    AccountId::from_bytes([seed; 16])
}

/// Install a fmt subscriber honoring `RUST_LOG`, for debugging test runs.
///
/// Safe to call from multiple tests; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
