//! Escrow error types
//!
//! Every error is a deterministic rejection of an attempted transition, issued
//! before any state is mutated. The variants group into the five rejection
//! classes: authorization, state mismatch, timing violation, amount mismatch,
//! and parameter validation, plus wrappers for accounting/ledger failures.

use crate::ledger::{AccountingError, LedgerError};
use duet_core::{AccountId, Amount, AmountError, BookingId, RequestId, SlotId, Timestamp};
use thiserror::Error;

/// Result alias for engine operations.
pub type EscrowResult<T> = Result<T, EscrowError>;

/// Errors from escrow engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    // --- Authorization ---
    /// Caller is not the host of the slot.
    #[error("caller is not the host of {slot_id}")]
    NotSlotHost {
        /// The slot in question
        slot_id: SlotId,
    },

    /// Caller is not the guest of the booking.
    #[error("caller is not the guest of {booking_id}")]
    NotBookingGuest {
        /// The booking in question
        booking_id: BookingId,
    },

    /// Caller is neither the guest nor the host of the booking.
    #[error("caller is not a party of {booking_id}")]
    NotBookingParty {
        /// The booking in question
        booking_id: BookingId,
    },

    /// Caller is not the guest of the request.
    #[error("caller is not the guest of {request_id}")]
    NotRequestGuest {
        /// The request in question
        request_id: RequestId,
    },

    /// Request targets a different host.
    #[error("{request_id} targets a different host")]
    NotRequestTarget {
        /// The request in question
        request_id: RequestId,
    },

    /// Caller is not the configured attester.
    #[error("caller is not the attester")]
    NotAttester,

    /// Caller is not the administrator.
    #[error("caller is not the administrator")]
    NotAdmin,

    // --- Not found ---
    /// Slot does not exist.
    #[error("{0} not found")]
    SlotNotFound(SlotId),

    /// Booking does not exist.
    #[error("{0} not found")]
    BookingNotFound(BookingId),

    /// Request does not exist.
    #[error("{0} not found")]
    RequestNotFound(RequestId),

    // --- State mismatch ---
    /// Slot is not open for the attempted transition.
    #[error("{slot_id} is not open (status: {found})")]
    SlotNotOpen {
        /// The slot in question
        slot_id: SlotId,
        /// The status actually found
        found: &'static str,
    },

    /// Booking is past the booked stage.
    #[error("{booking_id} is not in the booked stage (status: {found})")]
    BookingNotBooked {
        /// The booking in question
        booking_id: BookingId,
        /// The status actually found
        found: &'static str,
    },

    /// Booking carries no contestable attestation.
    #[error("{booking_id} is not attested (status: {found})")]
    BookingNotAttested {
        /// The booking in question
        booking_id: BookingId,
        /// The status actually found
        found: &'static str,
    },

    /// Booking is not under dispute.
    #[error("{booking_id} is not disputed (status: {found})")]
    BookingNotDisputed {
        /// The booking in question
        booking_id: BookingId,
        /// The status actually found
        found: &'static str,
    },

    /// Booking is neither attested nor resolved, so it cannot finalize.
    #[error("{booking_id} cannot finalize (status: {found})")]
    BookingNotFinalizable {
        /// The booking in question
        booking_id: BookingId,
        /// The status actually found
        found: &'static str,
    },

    /// Request is not open.
    #[error("{request_id} is not open (status: {found})")]
    RequestNotOpen {
        /// The request in question
        request_id: RequestId,
        /// The status actually found
        found: &'static str,
    },

    // --- Timing violations ---
    /// Completed attestation attempted before the minimum overlap elapsed.
    #[error("overlap not met: window opens at {opens_at}, now {now}")]
    OverlapNotMet {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the attestation window opens
        opens_at: Timestamp,
    },

    /// Completed attestation attempted too late.
    #[error("attestation too late: window closed at {closed_at}, now {now}")]
    AttestTooLate {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the attestation window closed
        closed_at: Timestamp,
    },

    /// No-show attestation attempted before the grace period elapsed.
    #[error("grace not over: window opens at {opens_at}, now {now}")]
    GraceNotOver {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the no-show window opens
        opens_at: Timestamp,
    },

    /// No-show attestation attempted too late.
    #[error("no-show too late: window closed at {closed_at}, now {now}")]
    NoShowTooLate {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the no-show window closed
        closed_at: Timestamp,
    },

    /// Finalize attempted while the challenge window is still open.
    #[error("challenge window open until {finalizable_at}, now {now}")]
    ChallengeWindowOpen {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the booking becomes finalizable
        finalizable_at: Timestamp,
    },

    /// Unattested claim attempted before the grace buffer elapsed.
    #[error("claim too early: claimable at {claimable_at}, now {now}")]
    ClaimTooEarly {
        /// Caller-supplied current time
        now: Timestamp,
        /// When the unattested claim becomes available
        claimable_at: Timestamp,
    },

    /// Dispute timeout finalization attempted before the timeout elapsed.
    #[error("dispute timeout pending until {resolvable_at}, now {now}")]
    DisputeTimeoutPending {
        /// Caller-supplied current time
        now: Timestamp,
        /// When timeout finalization becomes available
        resolvable_at: Timestamp,
    },

    /// Request acceptance attempted after its expiry.
    #[error("{request_id} expired at {expiry}, now {now}")]
    RequestExpired {
        /// The request in question
        request_id: RequestId,
        /// The request expiry
        expiry: Timestamp,
        /// Caller-supplied current time
        now: Timestamp,
    },

    /// Proposed start time falls outside the requested window.
    #[error("start {start_time} outside window [{window_start}, {window_end}]")]
    StartOutsideWindow {
        /// Proposed session start
        start_time: Timestamp,
        /// Window start
        window_start: Timestamp,
        /// Window end
        window_end: Timestamp,
    },

    /// Proposed start time is not far enough in the future.
    #[error("start {start_time} is too soon, earliest {earliest}")]
    StartTooSoon {
        /// Proposed session start
        start_time: Timestamp,
        /// Earliest acceptable start
        earliest: Timestamp,
    },

    // --- Amount mismatch ---
    /// Payment does not equal the required price exactly.
    #[error("payment mismatch: expected {expected}, got {got}")]
    PaymentMismatch {
        /// The required payment
        expected: Amount,
        /// The payment offered
        got: Amount,
    },

    /// Bond does not equal the configured challenge bond exactly.
    #[error("bond mismatch: expected {expected}, got {got}")]
    BondMismatch {
        /// The required bond
        expected: Amount,
        /// The bond offered
        got: Amount,
    },

    // --- Parameter validation ---
    /// A price must be strictly positive.
    #[error("price must be greater than zero")]
    ZeroPrice,

    /// An escrowed amount must be strictly positive.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// A session duration must be strictly positive.
    #[error("duration must be greater than zero")]
    ZeroDuration,

    /// A batch must create at least one slot.
    #[error("batch must create at least one slot")]
    EmptyBatch,

    /// Cancellation cutoff exceeds the seven-day limit.
    #[error("cancel cutoff {cancel_cutoff_mins}min exceeds the 10080min limit")]
    CutoffTooLong {
        /// The offending cutoff
        cancel_cutoff_mins: u32,
    },

    /// Request window ends before it starts.
    #[error("window inverted: start {window_start} after end {window_end}")]
    WindowInverted {
        /// Window start
        window_start: Timestamp,
        /// Window end
        window_end: Timestamp,
    },

    /// Request expiry lies past the end of the window.
    #[error("expiry {expiry} past window end {window_end}")]
    ExpiryPastWindow {
        /// The offending expiry
        expiry: Timestamp,
        /// Window end
        window_end: Timestamp,
    },

    /// Targeted request offers less than the host's base price.
    #[error("offer {offer} below base price {base_price}")]
    LowOffer {
        /// The offered amount
        offer: Amount,
        /// The target host's base price
        base_price: Amount,
    },

    /// Host has no base price configured.
    #[error("host {host} has no base price")]
    NoBasePrice {
        /// The host in question
        host: AccountId,
    },

    /// Configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },

    // --- Collaborator / invariant failures ---
    /// Amount arithmetic failed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Held-total accounting invariant was breached.
    #[error(transparent)]
    Accounting(#[from] AccountingError),

    /// The ledger submitter refused a fund movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl EscrowError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
