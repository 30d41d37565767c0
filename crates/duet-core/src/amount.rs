//! Amount and basis-point primitives
//!
//! All escrowed value is denominated in a single fungible balance unit. Fee
//! and penalty computations scale an `Amount` by `BasisPoints` through a
//! `u128` intermediate so the product can never overflow before the divide.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from amount arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Addition overflowed the amount representation.
    #[error("amount overflow: {lhs} + {rhs}")]
    Overflow {
        /// Left operand
        lhs: Amount,
        /// Right operand
        rhs: Amount,
    },

    /// Subtraction would go below zero.
    #[error("amount underflow: {lhs} - {rhs}")]
    Underflow {
        /// Left operand
        lhs: Amount,
        /// Right operand
        rhs: Amount,
    },
}

/// A quantity of the engine's single fungible balance unit.
///
/// Amounts are plain unsigned integers (micro-unit scale is conventional but
/// not assumed). All arithmetic is checked; the engine never saturates money.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Create a new amount from raw units.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw unit count.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(AmountError::Overflow { lhs: self, rhs })
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_sub(rhs.0)
            .map(Amount)
            .ok_or(AmountError::Underflow { lhs: self, rhs })
    }

    /// The basis-point share of this amount, rounded down.
    ///
    /// `1_000_000.bps_share(300)` is `30_000`. The share is always less than
    /// or equal to the amount for valid (≤ 10 000) basis points.
    #[must_use]
    pub fn bps_share(self, bps: BasisPoints) -> Amount {
        let product = u128::from(self.0) * u128::from(bps.value());
        // Quotient fits u64: bps <= 10_000 keeps the share <= self.
        Amount((product / u128::from(BasisPoints::SCALE)) as u64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A fee or penalty rate in basis points (1/10 000).
///
/// Valid rates lie in `[0, 10_000]`; configuration validation enforces the
/// upper bound before any rate reaches fee arithmetic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// The full scale: 10 000 basis points is 100%.
    pub const SCALE: u16 = 10_000;

    /// Create a new rate.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Return the raw basis-point value.
    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    /// Whether the rate is within `[0, 10_000]`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 <= Self::SCALE
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

impl From<u16> for BasisPoints {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
