//! Core identifier types used across the Duet engine
//!
//! Parties are identified by opaque `AccountId`s minted upstream by the
//! authenticator; the engine only compares them. Engine-owned records use
//! sequential numeric identifiers because batch slot creation promises
//! contiguous id assignment.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque party identifier.
///
/// An `AccountId` names a host, guest, attester, administrator, or treasury
/// account on the underlying ledger. The engine never interprets it beyond
/// equality checks against the roles a caller claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create from a UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the inner UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct-{}", self.0)
    }
}

impl From<Uuid> for AccountId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccountId> for Uuid {
    fn from(account_id: AccountId) -> Self {
        account_id.0
    }
}

macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Create from a raw sequence number.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Return the raw sequence number.
            pub fn value(self) -> u64 {
                self.0
            }

            /// The identifier immediately after this one.
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

sequential_id!(
    /// Identifier for a host-published bookable slot.
    ///
    /// Assigned contiguously by the engine; batch creation returns the first
    /// id of the run.
    SlotId,
    "slot"
);

sequential_id!(
    /// Identifier for a guest's paid reservation of a slot.
    BookingId,
    "booking"
);

sequential_id!(
    /// Identifier for a guest-initiated, pre-escrowed session request.
    RequestId,
    "request"
);

/// Opaque attestation evidence reference.
///
/// The attester hands over a hash or pointer alongside an outcome; the engine
/// stores it for the administrator and never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    /// Create a new evidence reference.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// View the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EvidenceRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
