//! Duet Core - Vocabulary Types
//!
//! This crate provides the foundational value types shared across the Duet
//! session escrow engine:
//!
//! - Identifiers: `AccountId` for parties, sequential `SlotId` / `BookingId` /
//!   `RequestId` for engine-owned records, `EvidenceRef` for opaque
//!   attestation evidence
//! - Money: `Amount` (single fungible balance unit) and `BasisPoints` with
//!   checked arithmetic and fee/penalty scaling
//! - Time: `Timestamp` (caller-supplied unix seconds) with minute and second
//!   arithmetic for deadline windows
//!
//! The engine never reads a clock and never mints randomness; every type here
//! is a plain value constructed from caller input, so the whole vocabulary is
//! deterministic and serializable.

pub mod amount;
pub mod identifiers;
pub mod time;

pub use amount::{Amount, AmountError, BasisPoints};
pub use identifiers::{AccountId, BookingId, EvidenceRef, RequestId, SlotId};
pub use time::Timestamp;
