//! Duet Escrow - Session Escrow & Dispute Engine
//!
//! A stateful protocol that lets a host offer bookable time slots for paid
//! sessions, lets a guest escrow payment to reserve one, lets a trusted
//! attester report whether the session happened, and lets either party
//! contest that report through a bonded challenge resolved by an
//! administrator or by timeout default.
//!
//! # Architecture
//!
//! The engine is a sequential state-transition processor over five
//! interacting components:
//!
//! - Ledger accounting (`ledger`): the `total_held` conservation invariant
//!   and the [`LedgerSubmitter`] collaborator boundary
//! - Slot manager (`slot`): host inventory with price snapshotting
//! - Booking lifecycle (`booking`): reservation, escrow, cancellation
//!   economics
//! - Attestation & finalization (`attestation`): outcome reports inside
//!   timing windows, payout computation
//! - Dispute resolution (`dispute`): bonded challenges, adjudication,
//!   timeout defaults
//! - Request matching (`request`): pre-escrowed offers converted into
//!   slot-and-booking pairs
//!
//! Deadlines are evaluated lazily against caller-supplied timestamps; there
//! are no background timers and no clock reads. Every operation either fully
//! applies or rejects with a typed [`EscrowError`] before any state changes.
//!
//! # Example
//!
//! ```ignore
//! use duet_escrow::{EscrowConfig, EscrowEngine};
//!
//! let mut engine = EscrowEngine::new(config)?;
//! engine.set_base_price(host, price)?;
//! let slot_id = engine.create_slot(host, start, 60, 10, 15, 120)?;
//! let booking_id = engine.book(&mut ledger, guest, slot_id, price)?;
//! // ... attest, maybe challenge, finalize
//! ```

pub mod admin;
pub mod attestation;
pub mod booking;
pub mod config;
pub mod dispute;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod request;
pub mod slot;
pub mod store;

pub use attestation::{Outcome, COMPLETED_ATTEST_SLACK_SECS};
pub use booking::{Booking, BookingStatus};
pub use config::EscrowConfig;
pub use engine::EscrowEngine;
pub use error::{EscrowError, EscrowResult};
pub use ledger::{AccountingError, HeldTotal, LedgerError, LedgerSubmitter};
pub use request::{Request, RequestStatus, MIN_LEAD_SECS};
pub use slot::{Slot, SlotStatus, MAX_CANCEL_CUTOFF_MINS};
pub use store::StoreError;
