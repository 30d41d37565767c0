//! Caller-supplied timestamps
//!
//! The engine is a lazy-deadline state machine: it never reads a clock, and
//! every operation receives the current time from its caller. `Timestamp`
//! carries unix seconds; window arithmetic converts the minute-denominated
//! slot fields at the call site.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time, in unix seconds, supplied by the caller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create from unix seconds.
    #[must_use]
    pub const fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    /// Return the unix seconds.
    #[must_use]
    pub fn unix(self) -> i64 {
        self.0
    }

    /// This timestamp advanced by a number of seconds.
    #[must_use]
    pub fn plus_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs as i64))
    }

    /// This timestamp advanced by a number of minutes.
    #[must_use]
    pub fn plus_mins(self, mins: u32) -> Self {
        self.plus_secs(u64::from(mins) * 60)
    }

    /// This timestamp moved back by a number of minutes.
    #[must_use]
    pub fn minus_mins(self, mins: u32) -> Self {
        Self(self.0.saturating_sub(i64::from(mins) * 60))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0, 0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(f, "unix:{}", self.0),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
